//! State names in LegiScan `state_id` order, plus abbreviation lookup.

/// Full state names indexed by `state_id - 1`.
pub const STATES: [&str; 52] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
    "DC",
    "US",
];

/// Full state name for a LegiScan numeric state id (1-based).
pub fn state_for_id(state_id: usize) -> Option<&'static str> {
    if state_id == 0 {
        return None;
    }
    STATES.get(state_id - 1).copied()
}

/// Full state name for a two-letter postal abbreviation.
pub fn state_for_abbrev(abbrev: &str) -> Option<&'static str> {
    let code = abbrev.trim().to_ascii_uppercase();
    let name = match code.as_str() {
        "AL" => "Alabama",
        "AK" => "Alaska",
        "AZ" => "Arizona",
        "AR" => "Arkansas",
        "CA" => "California",
        "CO" => "Colorado",
        "CT" => "Connecticut",
        "DE" => "Delaware",
        "FL" => "Florida",
        "GA" => "Georgia",
        "HI" => "Hawaii",
        "ID" => "Idaho",
        "IL" => "Illinois",
        "IN" => "Indiana",
        "IA" => "Iowa",
        "KS" => "Kansas",
        "KY" => "Kentucky",
        "LA" => "Louisiana",
        "ME" => "Maine",
        "MD" => "Maryland",
        "MA" => "Massachusetts",
        "MI" => "Michigan",
        "MN" => "Minnesota",
        "MS" => "Mississippi",
        "MO" => "Missouri",
        "MT" => "Montana",
        "NE" => "Nebraska",
        "NV" => "Nevada",
        "NH" => "New Hampshire",
        "NJ" => "New Jersey",
        "NM" => "New Mexico",
        "NY" => "New York",
        "NC" => "North Carolina",
        "ND" => "North Dakota",
        "OH" => "Ohio",
        "OK" => "Oklahoma",
        "OR" => "Oregon",
        "PA" => "Pennsylvania",
        "RI" => "Rhode Island",
        "SC" => "South Carolina",
        "SD" => "South Dakota",
        "TN" => "Tennessee",
        "TX" => "Texas",
        "UT" => "Utah",
        "VT" => "Vermont",
        "VA" => "Virginia",
        "WA" => "Washington",
        "WV" => "West Virginia",
        "WI" => "Wisconsin",
        "WY" => "Wyoming",
        "DC" => "DC",
        "US" => "US",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_id_ordering_matches_legiscan() {
        assert_eq!(state_for_id(1), Some("Alabama"));
        assert_eq!(state_for_id(35), Some("Ohio"));
        assert_eq!(state_for_id(52), Some("US"));
        assert_eq!(state_for_id(0), None);
        assert_eq!(state_for_id(53), None);
    }

    #[test]
    fn abbreviations_resolve() {
        assert_eq!(state_for_abbrev("oh"), Some("Ohio"));
        assert_eq!(state_for_abbrev(" TX "), Some("Texas"));
        assert_eq!(state_for_abbrev("ZZ"), None);
    }
}
