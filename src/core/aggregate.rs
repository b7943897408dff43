use crate::core::workforce::sanitize_display_name;
use crate::domain::model::{AggregatedWorker, WorkerEntry};
use std::collections::HashMap;

#[derive(Debug, Hash, PartialEq, Eq)]
enum WorkerKey {
    Name(String),
    Position(usize),
}

/// Merges worker entries by case-insensitive display name, summing hours.
///
/// Synthesized crew members (`no_aggregate`) are never merged. Output keeps
/// first-seen order; the first non-empty group label wins.
pub fn aggregate_workers(entries: &[WorkerEntry]) -> Vec<AggregatedWorker> {
    let mut slots: HashMap<WorkerKey, usize> = HashMap::new();
    let mut workers: Vec<AggregatedWorker> = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        let name = sanitize_display_name(&entry.name);
        if name.is_empty() {
            continue;
        }
        let key = if entry.no_aggregate {
            WorkerKey::Position(position)
        } else {
            WorkerKey::Name(name.to_lowercase())
        };

        let index = *slots.entry(key).or_insert_with(|| {
            workers.push(AggregatedWorker {
                name,
                group: String::new(),
                hours: 0.0,
                has_hours: false,
            });
            workers.len() - 1
        });

        let worker = &mut workers[index];
        if worker.group.is_empty() && !entry.group.is_empty() {
            worker.group = entry.group.clone();
        }
        if let Some(hours) = entry.hours {
            worker.hours += hours;
            worker.has_hours = true;
        }
    }

    tracing::debug!(entries = entries.len(), workers = workers.len(), "workers aggregated");
    workers
}
