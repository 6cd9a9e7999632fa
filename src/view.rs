use strum::Display;

use crate::api::AnomalyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Role {
    #[strum(serialize = "You")]
    User,
    #[strum(serialize = "Bot")]
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// All chat output goes through here rather than straight to the terminal,
/// so the controller can be exercised against a recording fake.
pub trait ChatView {
    fn message(&mut self, message: &ChatMessage);
}

pub trait UploadView {
    fn anomaly_table(&mut self, records: &[AnomalyRecord]);
    fn report_available(&mut self, url: &str);
}

/// Renders to stdout. Printing appends at the bottom of the scrollback, so
/// the newest message is always in view.
pub struct TerminalView;

impl ChatView for TerminalView {
    fn message(&mut self, message: &ChatMessage) {
        println!("{}: {}", message.role, message.text);
    }
}

impl UploadView for TerminalView {
    fn anomaly_table(&mut self, records: &[AnomalyRecord]) {
        print!("{}", render_table(records));
    }

    fn report_available(&mut self, url: &str) {
        println!("PDF report available at {url} (use /report to save it).");
    }
}

const HEADERS: [&str; 4] = ["Transaction ID", "Amount", "Anomaly", "Timestamp"];

pub fn render_table(records: &[AnomalyRecord]) -> String {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|record| {
            [
                record.transaction_id.clone(),
                record.amount.to_string(),
                record.anomaly.clone(),
                record.timestamp.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_owned), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Amount;

    fn record(id: &str, amount: Amount, label: &str, timestamp: &str) -> AnomalyRecord {
        AnomalyRecord {
            transaction_id: id.to_owned(),
            amount,
            anomaly: label.to_owned(),
            timestamp: timestamp.to_owned(),
        }
    }

    #[test]
    fn table_has_a_header_row_and_one_row_per_record_in_order() {
        let table = render_table(&[
            record("T1", Amount::Number(100.0), "high_value", "2024-01-01T00:00:00Z"),
            record("T2", Amount::Text("$7".to_owned()), "velocity", "2024-01-02T00:00:00Z"),
        ]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Transaction ID | Amount | Anomaly    | Timestamp"
        );
        assert_eq!(
            lines[1],
            "T1             | 100    | high_value | 2024-01-01T00:00:00Z"
        );
        assert_eq!(
            lines[2],
            "T2             | $7     | velocity   | 2024-01-02T00:00:00Z"
        );
    }

    #[test]
    fn roles_render_with_their_chat_prefixes() {
        assert_eq!(ChatMessage::user("hello").role.to_string(), "You");
        assert_eq!(ChatMessage::bot("hi").role.to_string(), "Bot");
    }
}
