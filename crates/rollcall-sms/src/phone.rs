//! Destination number normalisation.

/// Country calling code prepended to local numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "234";

/// Convert a locally-written number to the provider's international form
/// (digits only, no `+`).
///
/// A leading trunk `0` is replaced by the country code, numbers that already
/// start with the country code are kept, and anything else gets the code
/// prepended.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
  let phone = phone.trim();
  let phone = phone.strip_prefix('+').unwrap_or(phone);

  if let Some(local) = phone.strip_prefix('0') {
    format!("{country_code}{local}")
  } else if phone.starts_with(country_code) {
    phone.to_owned()
  } else {
    format!("{country_code}{phone}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trunk_zero_replaced() {
    assert_eq!(normalize_phone("0800000001", "234"), "234800000001");
  }

  #[test]
  fn already_international_kept() {
    assert_eq!(normalize_phone("2348000000001", "234"), "2348000000001");
    assert_eq!(normalize_phone("+2348000000001", "234"), "2348000000001");
  }

  #[test]
  fn bare_number_prefixed() {
    assert_eq!(normalize_phone(" 8000000001 ", "234"), "2348000000001");
  }
}
