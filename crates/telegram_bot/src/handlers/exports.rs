//! CSV export of a user's entries

use chrono_tz::Tz;
use conversation::Reply;
use engine::{AccountStore, EntryKind, ExportRow, MoneyCents};
use serde::Serialize;
use teloxide::{prelude::*, types::InputFile};

use crate::ConfigParameters;

use super::send_reply;

const FILE_NAME: &str = "entries.csv";
const EXPORT_FAILED: &str = "The export failed. Please try again later.";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("failed to finish the CSV document: {0}")]
    Finish(String),
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow<'a> {
    #[serde(rename = "Type")]
    kind: &'static str,
    category: &'a str,
    product: &'a str,
    amount: String,
    date: String,
}

/// Plain decimal amount, without the currency label.
fn decimal(amount: MoneyCents) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// `Type,Category,Product,Amount,Date` with dates in `timezone`.
pub(crate) fn to_csv(rows: &[ExportRow], timezone: Tz) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    for row in rows {
        writer.serialize(CsvRow {
            kind: match row.kind {
                EntryKind::Income => "Income",
                EntryKind::Expense => "Expense",
            },
            category: &row.category,
            product: row.product.as_deref().unwrap_or(""),
            amount: decimal(row.amount),
            date: row
                .timestamp
                .with_timezone(&timezone)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Finish(err.to_string()))
}

pub(crate) async fn send_export<S: AccountStore>(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters<S>,
    user_id: &str,
) -> ResponseResult<()> {
    let rows = match cfg.controller.ledger().export_rows(user_id).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(user_id, "failed to load entries for export: {err}");
            return send_reply(bot, cfg, chat_id, Reply::text(EXPORT_FAILED)).await;
        }
    };

    if rows.is_empty() {
        let notice = Reply::text("There is nothing to export yet.");
        return send_reply(bot, cfg, chat_id, notice).await;
    }

    let data = match to_csv(&rows, cfg.controller.timezone()) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!(user_id, "failed to build export: {err}");
            return send_reply(bot, cfg, chat_id, Reply::text(EXPORT_FAILED)).await;
        }
    };

    tracing::info!(user_id, rows = rows.len(), "export sent");
    bot.send_document(chat_id, InputFile::memory(data).file_name(FILE_NAME))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn csv_has_header_and_local_dates() {
        let rows = vec![
            ExportRow {
                kind: EntryKind::Income,
                category: "Salary".to_string(),
                product: None,
                amount: MoneyCents::new(10_000),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            },
            ExportRow {
                kind: EntryKind::Expense,
                category: "Food".to_string(),
                product: Some("Rice".to_string()),
                amount: MoneyCents::new(250),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 3, 30, 0).unwrap(),
            },
        ];

        let csv = String::from_utf8(to_csv(&rows, chrono_tz::America::Havana).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Type,Category,Product,Amount,Date\n\
             Income,Salary,,100.00,2024-03-01 05:00\n\
             Expense,Food,Rice,2.50,2024-03-01 22:30\n"
        );
    }

    #[test]
    fn decimal_keeps_two_digits() {
        assert_eq!(decimal(MoneyCents::new(5)), "0.05");
        assert_eq!(decimal(MoneyCents::new(-1_050)), "-10.50");
    }
}
