use super::directory::Directory;
use super::domain::Employee;

pub const SUGGESTION_LIMIT: usize = 10;

/// First matches in directory order whose name or card number contains `query`,
/// ignoring case. An empty query suggests nothing.
pub fn suggest<'a>(query: &str, directory: &'a Directory) -> Vec<&'a Employee> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    directory
        .iter()
        .filter(|employee| {
            employee.name.to_lowercase().contains(&needle)
                || employee.card_no.to_lowercase().contains(&needle)
        })
        .take(SUGGESTION_LIMIT)
        .collect()
}
