// Per-column cleansing rules shared by the silver transformers.
// Each function is pure: the transformers decide what to count and drop.

use chrono::NaiveDate;

/// Placeholder for values no rule could standardize.
pub const NOT_AVAILABLE: &str = "n/a";

/// Trim surrounding whitespace; empty or whitespace-only becomes `None`.
pub fn clean_str(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// CRM gender codes: M -> Male, F -> Female, anything else -> n/a.
pub fn normalize_gender(raw: Option<&str>) -> String {
    match clean_str(raw).as_deref().map(str::to_uppercase).as_deref() {
        Some("M") => "Male".to_string(),
        Some("F") => "Female".to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// ERP gender values come both as codes and full words.
pub fn normalize_erp_gender(raw: Option<&str>) -> String {
    match clean_str(raw).as_deref().map(str::to_uppercase).as_deref() {
        Some("M") | Some("MALE") => "Male".to_string(),
        Some("F") | Some("FEMALE") => "Female".to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// CRM marital status codes: S -> Single, M -> Married, else n/a.
pub fn normalize_marital_status(raw: Option<&str>) -> String {
    match clean_str(raw).as_deref().map(str::to_uppercase).as_deref() {
        Some("S") => "Single".to_string(),
        Some("M") => "Married".to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Product line codes: M -> Mountain, R -> Road, S -> Other Sales,
/// T -> Touring, else n/a.
pub fn normalize_product_line(raw: Option<&str>) -> String {
    match clean_str(raw).as_deref().map(str::to_uppercase).as_deref() {
        Some("M") => "Mountain".to_string(),
        Some("R") => "Road".to_string(),
        Some("S") => "Other Sales".to_string(),
        Some("T") => "Touring".to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// ERP country codes: DE -> Germany, US/USA -> United States,
/// empty -> n/a, anything else kept verbatim (trimmed).
pub fn normalize_country(raw: Option<&str>) -> String {
    let cleaned = match clean_str(raw) {
        Some(c) => c,
        None => return NOT_AVAILABLE.to_string(),
    };
    match cleaned.to_uppercase().as_str() {
        "DE" => "Germany".to_string(),
        "US" | "USA" => "United States".to_string(),
        _ => cleaned,
    }
}

/// The ERP demographic extract prefixes customer ids with "NAS"; strip it so
/// the id lines up with the CRM `cst_key`.
pub fn align_erp_customer_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix("NAS").unwrap_or(trimmed).to_string()
}

/// The ERP location extract hyphenates customer ids ("AW-00011000"); drop
/// the hyphens so the id lines up with the CRM `cst_key`.
pub fn align_erp_location_id(raw: &str) -> String {
    raw.trim().replace('-', "")
}

/// Parse an integer date in YYYYMMDD form. Non-positive values, values with
/// other digit counts, and dates outside [1900-01-01, 2050-01-01] are
/// rejected as invalid.
pub fn parse_compact_date(raw: Option<i64>) -> Option<NaiveDate> {
    let value = raw?;
    if value <= 0 || !(19000101..=20500101).contains(&value) {
        return None;
    }
    let year = (value / 10_000) as i32;
    let month = ((value / 100) % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an ISO `YYYY-MM-DD` date string.
pub fn parse_iso_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(clean_str(raw)?.as_str(), "%Y-%m-%d").ok()
}

/// Null out dates that lie in the future (birthdates cannot).
pub fn nulled_if_future(date: Option<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    match date {
        Some(d) if d > today => None,
        other => other,
    }
}

/// Split a raw CRM product key into (category id, product number).
/// "CO-RF-FR-R92B-58" -> ("CO_RF", "FR-R92B-58"). Keys too short to carry
/// both parts are rejected.
pub fn split_product_key(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    if trimmed.len() < 7 || !trimmed.is_ascii() {
        return None;
    }
    let cat_id = trimmed[..5].replace('-', "_");
    let product_number = trimmed[6..].to_string();
    if product_number.is_empty() {
        return None;
    }
    Some((cat_id, product_number))
}
