use std::collections::BTreeSet;

use super::analysis::top_entities;
use super::error::{DataError, Reference, Result};
use super::model::TimeTable;

// ---------------------------------------------------------------------------
// Locality selection
// ---------------------------------------------------------------------------

/// Which localities the dashboard is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocalitySelection {
    /// Every locality, in table order.
    #[default]
    All,
    /// The `n` largest localities of the last period, largest first.
    TopN(usize),
    /// An explicit set; resolved in table order.
    Manual(BTreeSet<String>),
}

/// Resolve a selection against a table into an ordered list of localities.
///
/// A manual selection naming a locality the table does not have is an
/// [`DataError::InvalidReference`]; an empty manual selection resolves to
/// nothing.
pub fn resolve(table: &TimeTable, selection: &LocalitySelection) -> Result<Vec<String>> {
    match selection {
        LocalitySelection::All => Ok(table.entities().to_vec()),
        LocalitySelection::TopN(n) => match table.last_period() {
            Some(last) => top_entities(table, last, *n),
            None => Ok(Vec::new()),
        },
        LocalitySelection::Manual(picked) => {
            if let Some(unknown) = picked
                .iter()
                .find(|name| !table.entities().contains(name))
            {
                return Err(DataError::invalid(Reference::Entity, unknown.as_str()));
            }
            Ok(table
                .entities()
                .iter()
                .filter(|e| picked.contains(*e))
                .cloned()
                .collect())
        }
    }
}

/// Default manual selection: the first `n` localities in table order.
pub fn first_localities(table: &TimeTable, n: usize) -> BTreeSet<String> {
    table.entities().iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    #[test]
    fn all_keeps_table_order() {
        assert_eq!(
            resolve(&table(), &LocalitySelection::All).unwrap(),
            ["SP", "MG", "AM"]
        );
    }

    #[test]
    fn top_n_ranks_by_last_period() {
        assert_eq!(
            resolve(&table(), &LocalitySelection::TopN(2)).unwrap(),
            ["SP", "MG"]
        );
        assert_eq!(resolve(&table(), &LocalitySelection::TopN(10)).unwrap().len(), 3);
    }

    #[test]
    fn manual_follows_table_order() {
        let picked: BTreeSet<String> = ["AM", "SP"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            resolve(&table(), &LocalitySelection::Manual(picked)).unwrap(),
            ["SP", "AM"]
        );
        assert!(resolve(&table(), &LocalitySelection::Manual(BTreeSet::new()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn manual_rejects_unknown_names() {
        let picked: BTreeSet<String> = ["RJ"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            resolve(&table(), &LocalitySelection::Manual(picked)),
            Err(DataError::InvalidReference { .. })
        ));
    }

    #[test]
    fn first_localities_takes_a_prefix() {
        let picked = first_localities(&table(), 2);
        assert!(picked.contains("SP") && picked.contains("MG"));
        assert_eq!(picked.len(), 2);
    }
}
