//! Result aggregation
//!
//! Workers finish in arbitrary order. The aggregator collects every outcome
//! into a map keyed by work-item id and then walks the work items in grid
//! order, so report rows always follow the declared traversal order no matter
//! how the batch was scheduled.

use gridbench_core::{
    Error, InvocationStatus, ParsedMetrics, Parameters, RawResult, Result, Role, WorkItem,
    WorkItemId,
};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One invocation's capture and what the parser made of it
#[derive(Debug)]
pub struct RoleOutcome {
    /// Verbatim capture
    pub raw: RawResult,
    /// Parsed metrics, or the parse error
    pub parsed: Result<ParsedMetrics>,
}

impl RoleOutcome {
    /// Pair a raw result with its parse outcome
    pub fn new(raw: RawResult, parsed: Result<ParsedMetrics>) -> Self {
        RoleOutcome { raw, parsed }
    }
}

/// Something that went wrong for one role of a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssue {
    /// The process exited non-zero, was killed, or never started
    InvocationFailed {
        /// Role of the failed invocation
        role: Role,
        /// Exit outcome
        detail: String,
    },
    /// The output could not be parsed
    ParseFailed {
        /// Role whose output was rejected
        role: Role,
        /// Parser error message
        reason: String,
    },
    /// No outcome was delivered for a declared role
    Missing {
        /// Role without an outcome
        role: Role,
    },
}

/// One work item's aggregated results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Work item id
    pub id: WorkItemId,
    /// Work item parameters
    pub parameters: Parameters,
    /// Metrics of all roles combined
    pub metrics: ParsedMetrics,
    /// Failures recorded for this row
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RowIssue>,
    /// Raw captures in declared role order
    #[serde(skip)]
    pub invocations: Vec<RawResult>,
}

impl ReportRow {
    /// Check if every role ran and parsed cleanly
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Aggregated report, ordered by work-item id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Rows in id order
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the report has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw captures in id order, roles in declared order
    pub fn invocations(&self) -> impl Iterator<Item = &RawResult> {
        self.rows.iter().flat_map(|r| r.invocations.iter())
    }

    /// Number of rows with at least one issue
    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_clean()).count()
    }
}

/// Builds a [`Report`] from outcomes delivered in any order
#[derive(Debug)]
pub struct ResultAggregator<'a> {
    items: &'a [WorkItem],
    roles: &'a [Role],
}

impl<'a> ResultAggregator<'a> {
    /// Aggregator for `items`, each of which runs the declared `roles`
    pub fn new(items: &'a [WorkItem], roles: &'a [Role]) -> Self {
        ResultAggregator { items, roles }
    }

    /// Metric key prefix for a role; only used when several roles share a row
    fn prefix(&self, role: Role) -> Option<&'static str> {
        if self.roles.len() > 1 {
            Some(role.as_str())
        } else {
            None
        }
    }

    /// Assemble the report
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if an outcome names an unknown work
    /// item or undeclared role, or if an `(id, role)` pair is delivered twice.
    pub fn aggregate(&self, outcomes: impl IntoIterator<Item = RoleOutcome>) -> Result<Report> {
        let mut by_id: FxHashMap<WorkItemId, FxHashMap<Role, RoleOutcome>> = FxHashMap::default();
        for outcome in outcomes {
            let id = outcome.raw.item_id;
            let role = outcome.raw.role;
            if !self.items.iter().any(|item| item.id == id) {
                return Err(Error::invariant(format!(
                    "outcome for unknown work item {}",
                    id
                )));
            }
            if !self.roles.contains(&role) {
                return Err(Error::invariant(format!(
                    "outcome for undeclared role '{}' of work item {}",
                    role, id
                )));
            }
            if by_id.entry(id).or_default().insert(role, outcome).is_some() {
                return Err(Error::invariant(format!(
                    "duplicate outcome for work item {} role '{}'",
                    id, role
                )));
            }
        }

        let mut rows = Vec::with_capacity(self.items.len());
        for item in self.items {
            let mut per_role = by_id.remove(&item.id).unwrap_or_default();
            let mut row = ReportRow {
                id: item.id,
                parameters: item.parameters.clone(),
                metrics: ParsedMetrics::new(),
                issues: Vec::new(),
                invocations: Vec::with_capacity(self.roles.len()),
            };

            for &role in self.roles {
                let Some(outcome) = per_role.remove(&role) else {
                    row.issues.push(RowIssue::Missing { role });
                    continue;
                };
                if outcome.raw.status != InvocationStatus::Success {
                    row.issues.push(RowIssue::InvocationFailed {
                        role,
                        detail: outcome.raw.status.to_string(),
                    });
                }
                match outcome.parsed {
                    Ok(metrics) => row.metrics.merge(metrics, self.prefix(role)),
                    Err(e) => row.issues.push(RowIssue::ParseFailed {
                        role,
                        reason: e.to_string(),
                    }),
                }
                row.invocations.push(outcome.raw);
            }
            rows.push(row);
        }

        let report = Report { rows };
        tracing::info!(
            rows = report.len(),
            failed = report.failed_rows(),
            "aggregated results"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::{Invocation, ParameterGrid};
    use serde_json::json;

    fn outcome(id: WorkItemId, role: Role, status: InvocationStatus, key: &str) -> RoleOutcome {
        let inv = Invocation::new(id, role, format!("cmd {} {}", id, role));
        let mut metrics = ParsedMetrics::new();
        metrics.insert(key, id as u64);
        RoleOutcome::new(RawResult::new(&inv, format!("out {}", id), status), Ok(metrics))
    }

    #[test]
    fn test_rows_follow_grid_order() {
        let items = ParameterGrid::range("type_id", 1..5).expand().unwrap();
        let roles = [Role::Measure];
        let outcomes = vec![
            outcome(3, Role::Measure, InvocationStatus::Success, "v"),
            outcome(0, Role::Measure, InvocationStatus::Success, "v"),
            outcome(2, Role::Measure, InvocationStatus::Success, "v"),
            outcome(1, Role::Measure, InvocationStatus::Success, "v"),
        ];
        let report = ResultAggregator::new(&items, &roles)
            .aggregate(outcomes)
            .unwrap();
        let ids: Vec<_> = report.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(report.rows()[2].metrics.get("v"), Some(&json!(2)));
        assert_eq!(report.failed_rows(), 0);
    }

    #[test]
    fn test_multiple_roles_are_prefixed() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Build, Role::Speed];
        let outcomes = vec![
            outcome(0, Role::Speed, InvocationStatus::Success, "find_us_query"),
            outcome(0, Role::Build, InvocationStatus::Success, "max_rss"),
        ];
        let report = ResultAggregator::new(&items, &roles)
            .aggregate(outcomes)
            .unwrap();
        let row = &report.rows()[0];
        assert!(row.metrics.contains("build.max_rss"));
        assert!(row.metrics.contains("speed.find_us_query"));
        // Captures follow declared role order, not delivery order
        let roles: Vec<_> = row.invocations.iter().map(|r| r.role).collect();
        assert_eq!(roles, vec![Role::Build, Role::Speed]);
    }

    #[test]
    fn test_failed_invocation_keeps_best_effort_metrics() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Measure];
        let outcomes = vec![outcome(
            0,
            Role::Measure,
            InvocationStatus::Failed { exit_code: Some(1) },
            "elapsed_sec",
        )];
        let report = ResultAggregator::new(&items, &roles)
            .aggregate(outcomes)
            .unwrap();
        let row = &report.rows()[0];
        assert!(row.metrics.contains("elapsed_sec"));
        assert_eq!(
            row.issues,
            vec![RowIssue::InvocationFailed {
                role: Role::Measure,
                detail: "exit status: 1".into()
            }]
        );
    }

    #[test]
    fn test_parse_error_recorded_per_row() {
        let items = ParameterGrid::range("type_id", 1..3).expand().unwrap();
        let roles = [Role::Build];
        let inv = Invocation::new(1, Role::Build, "cmd");
        let bad = RoleOutcome::new(
            RawResult::new(&inv, "garbage".into(), InvocationStatus::Success),
            Err(Error::parse("no structured blob in output")),
        );
        let outcomes = vec![bad, outcome(0, Role::Build, InvocationStatus::Success, "x")];
        let report = ResultAggregator::new(&items, &roles)
            .aggregate(outcomes)
            .unwrap();
        assert!(report.rows()[0].is_clean());
        assert!(report.rows()[1].metrics.is_empty());
        assert!(matches!(
            report.rows()[1].issues[0],
            RowIssue::ParseFailed { role: Role::Build, .. }
        ));
        assert_eq!(report.failed_rows(), 1);
    }

    #[test]
    fn test_missing_role_recorded() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Build, Role::Speed];
        let outcomes = vec![outcome(0, Role::Build, InvocationStatus::Success, "x")];
        let report = ResultAggregator::new(&items, &roles)
            .aggregate(outcomes)
            .unwrap();
        assert_eq!(
            report.rows()[0].issues,
            vec![RowIssue::Missing { role: Role::Speed }]
        );
    }

    #[test]
    fn test_unknown_id_rejected() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Measure];
        let err = ResultAggregator::new(&items, &roles)
            .aggregate(vec![outcome(5, Role::Measure, InvocationStatus::Success, "x")])
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
    }

    #[test]
    fn test_undeclared_role_rejected() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Measure];
        let err = ResultAggregator::new(&items, &roles)
            .aggregate(vec![outcome(0, Role::Build, InvocationStatus::Success, "x")])
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
    }

    #[test]
    fn test_duplicate_outcome_rejected() {
        let items = ParameterGrid::range("type_id", 1..2).expand().unwrap();
        let roles = [Role::Measure];
        let err = ResultAggregator::new(&items, &roles)
            .aggregate(vec![
                outcome(0, Role::Measure, InvocationStatus::Success, "x"),
                outcome(0, Role::Measure, InvocationStatus::Success, "x"),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
    }

    #[test]
    fn test_empty_grid_gives_empty_report() {
        let report = ResultAggregator::new(&[], &[Role::Measure])
            .aggregate(Vec::new())
            .unwrap();
        assert!(report.is_empty());
    }
}
