//! Store methods for result sets: overall row, group tables, data quality.

use crate::{
    aggregate::{GroupMetrics, GroupTable, OverallMetrics},
    dimension::Dimension,
    error::{RoiError, RoiResult},
    normalize::DataQualityReport,
    result_set::ResultSet,
    tier::PerformanceTier,
};
use rusqlite::{params, OptionalExtension};

use super::ResultStore;

impl ResultStore {
    /// Persist every table of a result set in one transaction.
    /// The run row must already exist.
    pub fn save_result_set(&self, results: &ResultSet) -> RoiResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        self.insert_overall_metrics(&results.run_id, &results.overall_metrics)?;
        for (name, table) in results.tables() {
            self.insert_group_table(&results.run_id, name, table)?;
        }
        if let Some(report) = &results.data_quality {
            self.conn.execute(
                "INSERT OR REPLACE INTO data_quality (run_id, report_json) VALUES (?1, ?2)",
                params![results.run_id, serde_json::to_string(report)?],
            )?;
        }

        tx.commit()?;
        log::debug!("Result set {} persisted", results.run_id);
        Ok(())
    }

    fn insert_overall_metrics(&self, run_id: &str, m: &OverallMetrics) -> RoiResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO overall_metrics (
                run_id, record_count, total_spend, total_impressions, total_clicks,
                total_conversions, total_revenue, total_profit, roi, roas, cpa, ctr,
                conversion_rate
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run_id,
                m.record_count as i64,
                m.total_spend,
                m.total_impressions,
                m.total_clicks,
                m.total_conversions,
                m.total_revenue,
                m.total_profit,
                m.roi,
                m.roas,
                m.cpa,
                m.ctr,
                m.conversion_rate,
            ],
        )?;
        Ok(())
    }

    fn insert_group_table(&self, run_id: &str, name: &str, table: &GroupTable) -> RoiResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO result_table (run_id, table_name, dimension)
             VALUES (?1, ?2, ?3)",
            params![run_id, name, table.dimension.column_name()],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO group_metrics (
                run_id, table_name, row_order, group_key, spent, impressions, clicks,
                approved_conversion, revenue, profit, roi, roas, cpa, ctr, conversion_rate,
                spend_share, conversion_share, efficiency_score, performance_tier
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                       ?16, ?17, ?18, ?19)",
        )?;

        for (order, row) in table.rows.iter().enumerate() {
            stmt.execute(params![
                run_id,
                name,
                order as i64,
                row.key,
                row.spent,
                row.impressions,
                row.clicks,
                row.approved_conversion,
                row.revenue,
                row.profit,
                row.roi,
                row.roas,
                row.cpa,
                row.ctr,
                row.conversion_rate,
                row.spend_share,
                row.conversion_share,
                row.efficiency_score,
                row.performance_tier.map(|t| t.as_str()),
            ])?;
        }
        Ok(())
    }

    pub fn overall_metrics(&self, run_id: &str) -> RoiResult<Option<OverallMetrics>> {
        let metrics = self
            .conn
            .query_row(
                "SELECT record_count, total_spend, total_impressions, total_clicks,
                        total_conversions, total_revenue, total_profit, roi, roas, cpa,
                        ctr, conversion_rate
                 FROM overall_metrics WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(OverallMetrics {
                        record_count: row.get::<_, i64>(0)? as usize,
                        total_spend: row.get(1)?,
                        total_impressions: row.get(2)?,
                        total_clicks: row.get(3)?,
                        total_conversions: row.get(4)?,
                        total_revenue: row.get(5)?,
                        total_profit: row.get(6)?,
                        roi: row.get(7)?,
                        roas: row.get(8)?,
                        cpa: row.get(9)?,
                        ctr: row.get(10)?,
                        conversion_rate: row.get(11)?,
                    })
                },
            )
            .optional()?;
        Ok(metrics)
    }

    /// Load one named group table in its saved row order.
    pub fn group_table(&self, run_id: &str, table_name: &str) -> RoiResult<GroupTable> {
        let dimension: Option<String> = self
            .conn
            .query_row(
                "SELECT dimension FROM result_table WHERE run_id = ?1 AND table_name = ?2",
                params![run_id, table_name],
                |row| row.get(0),
            )
            .optional()?;

        let dimension = dimension
            .as_deref()
            .and_then(Dimension::from_column_name)
            .ok_or_else(|| RoiError::TableNotFound {
                name: table_name.to_string(),
            })?;

        let mut stmt = self.conn.prepare(
            "SELECT group_key, spent, impressions, clicks, approved_conversion, revenue,
                    profit, roi, roas, cpa, ctr, conversion_rate, spend_share,
                    conversion_share, efficiency_score, performance_tier
             FROM group_metrics
             WHERE run_id = ?1 AND table_name = ?2
             ORDER BY row_order ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id, table_name], |row| {
                Ok(GroupMetrics {
                    key: row.get(0)?,
                    spent: row.get(1)?,
                    impressions: row.get(2)?,
                    clicks: row.get(3)?,
                    approved_conversion: row.get(4)?,
                    revenue: row.get(5)?,
                    profit: row.get(6)?,
                    roi: row.get(7)?,
                    roas: row.get(8)?,
                    cpa: row.get(9)?,
                    ctr: row.get(10)?,
                    conversion_rate: row.get(11)?,
                    spend_share: row.get(12)?,
                    conversion_share: row.get(13)?,
                    efficiency_score: row.get(14)?,
                    performance_tier: row
                        .get::<_, Option<String>>(15)?
                        .as_deref()
                        .and_then(PerformanceTier::parse),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GroupTable { dimension, rows })
    }

    pub fn group_row_count(&self, run_id: &str, table_name: &str) -> RoiResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM group_metrics WHERE run_id = ?1 AND table_name = ?2",
            params![run_id, table_name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn data_quality(&self, run_id: &str) -> RoiResult<Option<DataQualityReport>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT report_json FROM data_quality WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }
}
