//! Analytics scripts in execution order.
//!
//! The SQL files live under `sql/` and are compiled into the binary so the
//! deployed service has no filesystem dependency. Order matters: later
//! scripts read tables the earlier ones create.

/// One analytics pipeline step.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub file: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

/// SQL files in execution order.
pub const SQL_SCRIPTS: &[Script] = &[
    Script {
        file: "01-get-monthly-conflicts.sql",
        description: "Creating monthly_conflict_snapshots",
        sql: include_str!("../../sql/01-get-monthly-conflicts.sql"),
    },
    Script {
        file: "02-monthly-conflict-changes.sql",
        description: "Creating monthly_conflict_changes",
        sql: include_str!("../../sql/02-monthly-conflict-changes.sql"),
    },
    Script {
        file: "04-monthly-conflict-scv-snapshots.sql",
        description: "Creating monthly_conflict_scv_snapshots",
        sql: include_str!("../../sql/04-monthly-conflict-scv-snapshots.sql"),
    },
    Script {
        file: "05-monthly-conflict-scv-changes.sql",
        description: "Creating monthly_conflict_scv_changes",
        sql: include_str!("../../sql/05-monthly-conflict-scv-changes.sql"),
    },
    Script {
        file: "06-resolution-modification-analytics.sql",
        description: "Creating conflict_resolution_analytics",
        sql: include_str!("../../sql/06-resolution-modification-analytics.sql"),
    },
    Script {
        file: "07-google-sheets-analytics.sql",
        description: "Creating Google Sheets views",
        sql: include_str!("../../sql/07-google-sheets-analytics.sql"),
    },
];

/// The views-only subset: just the final dashboard views, for a quick
/// refresh without rebuilding the snapshot tables.
pub fn views_only_scripts() -> &'static [Script] {
    &SQL_SCRIPTS[SQL_SCRIPTS.len() - 1..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_are_ordered_and_nonempty() {
        assert_eq!(SQL_SCRIPTS.len(), 6);
        let mut last = "";
        for script in SQL_SCRIPTS {
            assert!(script.file > last, "scripts out of order: {}", script.file);
            assert!(!script.sql.trim().is_empty(), "{} is empty", script.file);
            last = script.file;
        }
    }

    #[test]
    fn test_views_only_is_final_script() {
        let subset = views_only_scripts();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].file, "07-google-sheets-analytics.sql");
    }
}
