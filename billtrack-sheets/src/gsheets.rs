//! Google Sheets REST implementation of [`SheetStore`].
//!
//! Thin wrapper over the v4 values/batchUpdate endpoints with a bearer
//! token; the sync core never sees Google-specific types.

use billtrack_core::HeaderMap;
use serde_json::{json, Value};

use crate::error::SheetError;
use crate::store::{col_letters, parse_a1_range, CellStyle, CellUpdate, SheetStore};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// One worksheet of one Google spreadsheet.
pub struct GoogleSheets {
    agent: ureq::Agent,
    token: String,
    spreadsheet_id: String,
    worksheet: String,
    /// Numeric sheet id, resolved lazily for formatting calls.
    sheet_id: Option<i64>,
}

impl GoogleSheets {
    pub fn open(
        agent: ureq::Agent,
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Self {
        GoogleSheets {
            agent,
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            sheet_id: None,
        }
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{API_BASE}/{}/values/{}",
            self.spreadsheet_id,
            encode_range(&format!("'{}'!{}", self.worksheet, range))
        )
    }

    fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let response = self
            .agent
            .get(&self.values_url(range))
            .set("Authorization", &self.auth())
            .call()?;
        let body: Value = response.into_json()?;
        let Some(rows) = body.get("values").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(cell_text).collect())
                    .unwrap_or_default()
            })
            .collect())
    }

    fn resolve_sheet_id(&mut self) -> Result<i64, SheetError> {
        if let Some(id) = self.sheet_id {
            return Ok(id);
        }
        let url = format!(
            "{API_BASE}/{}?fields=sheets.properties",
            self.spreadsheet_id
        );
        let body: Value = self
            .agent
            .get(&url)
            .set("Authorization", &self.auth())
            .call()?
            .into_json()?;
        let sheets = body
            .get("sheets")
            .and_then(Value::as_array)
            .ok_or_else(|| SheetError::Protocol("spreadsheet metadata without sheets".into()))?;
        for sheet in sheets {
            let props = &sheet["properties"];
            if props["title"].as_str() == Some(self.worksheet.as_str()) {
                let id = props["sheetId"].as_i64().ok_or_else(|| {
                    SheetError::Protocol(format!("worksheet '{}' has no sheetId", self.worksheet))
                })?;
                self.sheet_id = Some(id);
                return Ok(id);
            }
        }
        Err(SheetError::Protocol(format!(
            "worksheet '{}' not found in spreadsheet",
            self.worksheet
        )))
    }
}

impl SheetStore for GoogleSheets {
    fn read_header_row(&self) -> Result<Vec<String>, SheetError> {
        Ok(self.get_values("1:1")?.into_iter().next().unwrap_or_default())
    }

    fn read_all_records(&self, headers: &HeaderMap) -> Result<Vec<Vec<String>>, SheetError> {
        let width = headers.len();
        let last_col = col_letters(width.saturating_sub(1));
        let rows = self.get_values(&format!("A2:{last_col}"))?;
        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect())
    }

    fn batch_update(&mut self, updates: &[CellUpdate]) -> Result<(), SheetError> {
        if updates.is_empty() {
            return Ok(());
        }
        let data: Vec<Value> = updates
            .iter()
            .map(|u| {
                json!({
                    "range": format!("'{}'!{}", self.worksheet, u.a1()),
                    "values": [[u.value]],
                })
            })
            .collect();
        let url = format!("{API_BASE}/{}/values:batchUpdate", self.spreadsheet_id);
        tracing::info!(
            "batch-updating {} cell(s) on '{}'",
            updates.len(),
            self.worksheet
        );
        self.agent
            .post(&url)
            .set("Authorization", &self.auth())
            .send_json(json!({
                "valueInputOption": "USER_ENTERED",
                "data": data,
            }))?;
        Ok(())
    }

    fn format_range(&mut self, range: &str, style: &CellStyle) -> Result<(), SheetError> {
        let sheet_id = self.resolve_sheet_id()?;
        let (start_row, start_col, end_row, end_col) = parse_a1_range(range)?;

        let mut text_format = json!({});
        if let Some(size) = style.font_size {
            text_format["fontSize"] = json!(size);
        }
        if let Some(family) = &style.font_family {
            text_format["fontFamily"] = json!(family);
        }
        let mut format = json!({ "textFormat": text_format });
        let mut fields = vec!["userEnteredFormat.textFormat"];
        if style.center {
            format["horizontalAlignment"] = json!("CENTER");
            fields.push("userEnteredFormat.horizontalAlignment");
        }
        if style.date_format {
            format["numberFormat"] = json!({ "type": "DATE" });
            fields.push("userEnteredFormat.numberFormat");
        }

        let url = format!("{API_BASE}/{}:batchUpdate", self.spreadsheet_id);
        self.agent
            .post(&url)
            .set("Authorization", &self.auth())
            .send_json(json!({
                "requests": [{
                    "repeatCell": {
                        "range": {
                            "sheetId": sheet_id,
                            "startRowIndex": start_row,
                            "endRowIndex": end_row,
                            "startColumnIndex": start_col,
                            "endColumnIndex": end_col,
                        },
                        "cell": { "userEnteredFormat": format },
                        "fields": fields.join(","),
                    }
                }]
            }))?;
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn encode_range(range: &str) -> String {
    range.replace(' ', "%20")
}
