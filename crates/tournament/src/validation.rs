use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{EngineError, Result};
use crate::models::{QualifierRef, SlotKey, SlotReference, TournamentFormat};

pub struct FormatValidator;

impl FormatValidator {
    pub fn validate(format: &TournamentFormat) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        if format.name.trim().is_empty() {
            report.errors.push("Format name is required".to_string());
        }
        if format.teams_per_group < 2 {
            report.errors.push(format!(
                "teams_per_group must be >= 2, got {}",
                format.teams_per_group
            ));
        }
        if format.best_thirds > format.groups.len() {
            report.errors.push(format!(
                "best_thirds ({}) exceeds the number of groups ({})",
                format.best_thirds,
                format.groups.len()
            ));
        }

        Self::check_groups(format, &mut report);
        Self::check_knockout(format, &mut report);

        if !report.errors.is_empty() {
            Err(EngineError::InvalidFormat(format!(
                "{} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }

    fn check_groups(format: &TournamentFormat, report: &mut ValidationReport) {
        let mut labels = HashSet::new();
        let mut teams = HashSet::new();
        let mut match_ids = HashSet::new();

        for group in &format.groups {
            if group.label.trim().is_empty() {
                report.errors.push("Group label cannot be empty".to_string());
            }
            if !labels.insert(group.label.as_str()) {
                report
                    .errors
                    .push(format!("Duplicate group label: '{}'", group.label));
            }
            if group.teams.len() != format.teams_per_group {
                report.errors.push(format!(
                    "Group '{}' has {} teams, expected {}",
                    group.label,
                    group.teams.len(),
                    format.teams_per_group
                ));
            }
            for team in &group.teams {
                if !teams.insert(team.as_str()) {
                    report
                        .errors
                        .push(format!("Team '{}' appears in more than one group", team));
                }
            }

            for m in &group.matches {
                for side in [&m.home, &m.away] {
                    if !group.contains(side) {
                        report.errors.push(format!(
                            "Match '{}' in group '{}' references unknown team '{}'",
                            m.id(),
                            group.label,
                            side
                        ));
                    }
                }
                if m.home == m.away {
                    report.errors.push(format!(
                        "Match '{}' in group '{}' pits a team against itself",
                        m.id(),
                        group.label
                    ));
                }
                if !match_ids.insert(m.id()) {
                    report
                        .errors
                        .push(format!("Duplicate group match: '{}'", m.id()));
                }
            }

            let n = group.teams.len();
            let round_robin = n * n.saturating_sub(1) / 2;
            if group.matches.len() != round_robin {
                report.warnings.push(format!(
                    "Group '{}' schedules {} matches, a single round robin has {}",
                    group.label,
                    group.matches.len(),
                    round_robin
                ));
            }
        }
    }

    fn check_knockout(format: &TournamentFormat, report: &mut ValidationReport) {
        let knockout = &format.knockout;
        if knockout.rounds.is_empty() {
            report
                .errors
                .push("At least one knockout round is required".to_string());
            return;
        }

        let mut round_ids = HashSet::new();
        let mut slot_round: HashMap<SlotKey, usize> = HashMap::new();
        for (idx, round) in knockout.rounds.iter().enumerate() {
            if !round_ids.insert(round.id.as_str()) {
                report
                    .errors
                    .push(format!("Duplicate round id: '{}'", round.id));
            }
            if round.slots.is_empty() {
                report
                    .errors
                    .push(format!("Round '{}' has no slots", round.id));
            }
            if !format.points.round_presence.contains_key(&round.id) {
                report.warnings.push(format!(
                    "Round '{}' has no presence points configured",
                    round.id
                ));
            }
            for slot in &round.slots {
                if slot_round.insert(slot.key, idx).is_some() {
                    report
                        .errors
                        .push(format!("Duplicate slot key: {}", slot.key));
                }
            }
        }

        let last = knockout.rounds.len() - 1;
        if slot_round.get(&knockout.final_slot) != Some(&last) {
            report.errors.push(format!(
                "Final slot {} must belong to the last round",
                knockout.final_slot
            ));
        }

        let mut qualifier_refs = HashSet::new();
        let mut third_ranks = HashSet::new();
        for (idx, round) in knockout.rounds.iter().enumerate() {
            for slot in &round.slots {
                for reference in [&slot.home, &slot.away] {
                    match reference {
                        SlotReference::Team(name) => {
                            if name.trim().is_empty() {
                                report
                                    .errors
                                    .push(format!("Slot {} has an empty team name", slot.key));
                            }
                        }
                        SlotReference::WinnerOf(upstream) | SlotReference::LoserOf(upstream) => {
                            match slot_round.get(upstream) {
                                None => report.errors.push(format!(
                                    "Slot {} references unknown slot {}",
                                    slot.key, upstream
                                )),
                                Some(&upstream_round) if idx == 0 || upstream_round != idx - 1 => {
                                    report.errors.push(format!(
                                        "Slot {} must reference the round before '{}', slot {} is in '{}'",
                                        slot.key,
                                        round.id,
                                        upstream,
                                        knockout.rounds[upstream_round].id
                                    ))
                                }
                                Some(_) => {}
                            }
                        }
                        SlotReference::Qualifier(qualifier) => {
                            if idx != 0 {
                                report.errors.push(format!(
                                    "Slot {} uses a group qualifier outside the first round",
                                    slot.key
                                ));
                            }
                            Self::check_qualifier(
                                format,
                                slot.key,
                                qualifier,
                                &mut qualifier_refs,
                                &mut third_ranks,
                                report,
                            );
                        }
                    }
                }
            }
        }

        if third_ranks.len() != format.best_thirds {
            report.warnings.push(format!(
                "{} best-third reference(s) for {} qualifying thirds",
                third_ranks.len(),
                format.best_thirds
            ));
        }
    }

    fn check_qualifier(
        format: &TournamentFormat,
        slot: SlotKey,
        qualifier: &QualifierRef,
        seen: &mut HashSet<String>,
        third_ranks: &mut HashSet<usize>,
        report: &mut ValidationReport,
    ) {
        match qualifier {
            QualifierRef::GroupPosition { group, position } => {
                if format.group(group).is_none() {
                    report
                        .errors
                        .push(format!("Slot {} references unknown group '{}'", slot, group));
                }
                if *position < 1 || *position > format.teams_per_group {
                    report.errors.push(format!(
                        "Slot {} references invalid position {} in group '{}'",
                        slot, position, group
                    ));
                }
            }
            QualifierRef::BestThird {
                rank,
                eligible_groups,
            } => {
                if *rank < 1 || *rank > format.best_thirds {
                    report.errors.push(format!(
                        "Slot {} references best third #{}, only {} qualify",
                        slot, rank, format.best_thirds
                    ));
                }
                third_ranks.insert(*rank);
                for group in eligible_groups {
                    if format.group(group).is_none() {
                        report.errors.push(format!(
                            "Slot {} lists unknown eligible group '{}'",
                            slot, group
                        ));
                    }
                }
            }
        }

        if !seen.insert(qualifier.placeholder()) {
            report.errors.push(format!(
                "Qualifier '{}' is used more than once (slot {})",
                qualifier.placeholder(),
                slot
            ));
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
