use super::context::AppContext;
use crate::output::{styled_table, Output};
use crate::SettingsCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use nextup_core::collections::same_collection;
use nextup_models::{Settings, MAX_SYNC_INTERVAL_HOURS};

pub fn run_settings(cmd: SettingsCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.open_store()?;
    let mut settings = store
        .get_settings()
        .map_err(|e| eyre!("Failed to read settings: {:#}", e))?;

    match cmd {
        SettingsCommands::Show => {
            show_settings(&settings, output);
            Ok(())
        }
        SettingsCommands::Set {
            tv_weight,
            movie_weight,
            interval_hours,
            selected_collection,
            clear_selected_collection,
            ignore_tv,
            unignore_tv,
            ignore_movie,
            unignore_movie,
        } => {
            if let Some(weight) = tv_weight {
                settings.tv_weight = validate_weight("tv-weight", weight)?;
            }
            if let Some(weight) = movie_weight {
                settings.movie_weight = validate_weight("movie-weight", weight)?;
            }
            if let Some(hours) = interval_hours {
                settings.sync_interval_hours = validate_interval(hours)?;
            }
            if clear_selected_collection {
                settings.selected_collection = None;
            } else if let Some(name) = selected_collection {
                settings.selected_collection = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            }
            edit_list(&mut settings.ignored_tv_collections, ignore_tv, &unignore_tv);
            edit_list(&mut settings.ignored_movie_collections, ignore_movie, &unignore_movie);

            store
                .update_settings(&settings)
                .map_err(|e| eyre!("Failed to save settings: {:#}", e))?;
            output.success("Settings updated");
            show_settings(&settings, output);
            Ok(())
        }
    }
}

fn validate_weight(flag: &str, weight: f64) -> Result<f64> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(eyre!("--{} must be a non-negative number", flag));
    }
    Ok(weight)
}

fn validate_interval(hours: u32) -> Result<u32> {
    if hours == 0 || hours > MAX_SYNC_INTERVAL_HOURS {
        return Err(eyre!(
            "--interval-hours must be between 1 and {}",
            MAX_SYNC_INTERVAL_HOURS
        ));
    }
    Ok(hours)
}

/// Adds names not already present (by collection identity) and removes
/// matching ones.
fn edit_list(list: &mut Vec<String>, add: Vec<String>, remove: &[String]) {
    for name in add {
        let name = name.trim().to_string();
        if !name.is_empty() && !list.iter().any(|existing| same_collection(existing, &name)) {
            list.push(name);
        }
    }
    list.retain(|existing| !remove.iter().any(|r| same_collection(existing, r)));
}

fn show_settings(settings: &Settings, output: &Output) {
    if !output.is_human() {
        output.data(settings);
        return;
    }

    let none = || "(none)".to_string();
    let list = |names: &[String]| if names.is_empty() { none() } else { names.join(", ") };

    let mut table = styled_table(&["Setting", "Value"]);
    table.add_row(vec![Cell::new("TV weight"), Cell::new(settings.tv_weight)]);
    table.add_row(vec![Cell::new("Movie weight"), Cell::new(settings.movie_weight)]);
    table.add_row(vec![
        Cell::new("Sync interval"),
        Cell::new(format!("{}h", settings.sync_interval_hours)),
    ]);
    table.add_row(vec![
        Cell::new("Selected collection"),
        Cell::new(settings.selected_collection.clone().unwrap_or_else(none)),
    ]);
    table.add_row(vec![
        Cell::new("Ignored TV collections"),
        Cell::new(list(&settings.ignored_tv_collections)),
    ]);
    table.add_row(vec![
        Cell::new("Ignored movie collections"),
        Cell::new(list(&settings.ignored_movie_collections)),
    ]);
    output.table(&table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_list_dedupes_by_collection() {
        let mut list = vec!["Christmas Collection".to_string()];
        edit_list(
            &mut list,
            vec!["christmas".to_string(), "Halloween".to_string(), " ".to_string()],
            &[],
        );
        assert_eq!(list, vec!["Christmas Collection", "Halloween"]);

        edit_list(&mut list, Vec::new(), &["CHRISTMAS".to_string()]);
        assert_eq!(list, vec!["Halloween"]);
    }

    #[test]
    fn test_validate_interval_bounds() {
        assert_eq!(validate_interval(12).unwrap(), 12);
        assert_eq!(validate_interval(MAX_SYNC_INTERVAL_HOURS).unwrap(), MAX_SYNC_INTERVAL_HOURS);
        assert!(validate_interval(0).is_err());
        assert!(validate_interval(u32::MAX).is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert_eq!(validate_weight("tv-weight", 2.5).unwrap(), 2.5);
        assert!(validate_weight("tv-weight", -1.0).is_err());
        assert!(validate_weight("tv-weight", f64::NAN).is_err());
    }
}
