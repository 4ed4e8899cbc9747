use crate::cli::ThemeCommands;
use crate::error::Result;
use crate::output;
use crate::store::KeyValueStore;
use crate::theme::{load_theme, save_theme, toggle_theme};

pub fn run<K: KeyValueStore>(store: &K, action: Option<ThemeCommands>) -> Result<()> {
    let theme = match action.unwrap_or(ThemeCommands::Show) {
        ThemeCommands::Show => load_theme(store),
        ThemeCommands::Toggle => toggle_theme(store)?,
        ThemeCommands::Set { theme } => {
            save_theme(store, theme)?;
            theme
        }
    };

    output::set_theme(theme);
    output::print_item(&serde_json::json!({ "theme": theme }), |_| {
        println!("Theme: {}", output::heading(theme.as_str()));
    });

    Ok(())
}
