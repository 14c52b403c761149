//! Risk-lookup formula helpers.
//!
//! Risk ratings live on a dedicated `State Risk` sheet maintained by the
//! policy team; tracker rows reference it with VLOOKUP formulas so rating
//! edits propagate without another sync pass.

/// Name of the sheet holding per-state risk ratings.
pub const RISK_SHEET: &str = "State Risk";

/// Formula for the `Adult State Risk` cell of a given 1-based sheet row.
/// `state_col` is the letter of the column holding the state name.
pub fn adult_risk_formula(state_col: &str, sheet_row: usize) -> String {
    risk_formula(state_col, sheet_row, 2)
}

/// Formula for the `Youth State Risk` cell of a given 1-based sheet row.
pub fn youth_risk_formula(state_col: &str, sheet_row: usize) -> String {
    risk_formula(state_col, sheet_row, 3)
}

fn risk_formula(state_col: &str, sheet_row: usize, risk_col: usize) -> String {
    format!("=VLOOKUP(TRIM(${state_col}{sheet_row}),'{RISK_SHEET}'!$A:$C,{risk_col},FALSE)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formulas_reference_the_row_state_cell() {
        assert_eq!(
            adult_risk_formula("A", 2),
            "=VLOOKUP(TRIM($A2),'State Risk'!$A:$C,2,FALSE)"
        );
        assert_eq!(
            youth_risk_formula("A", 17),
            "=VLOOKUP(TRIM($A17),'State Risk'!$A:$C,3,FALSE)"
        );
    }

    #[test]
    fn state_column_is_not_assumed_to_be_first() {
        assert_eq!(
            adult_risk_formula("C", 4),
            "=VLOOKUP(TRIM($C4),'State Risk'!$A:$C,2,FALSE)"
        );
    }
}
