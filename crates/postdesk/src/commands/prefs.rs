//! UI preference handlers. Changes persist in the session record.

use serde::Serialize;

use postdesk_core::{Dashboard, Theme};

use crate::cli::{GlobalOpts, PrefsArgs, PrefsCommand, SidebarArg, ThemeArg};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Prefs {
    theme: Theme,
    sidebar_collapsed: bool,
}

fn detail(p: &Prefs) -> String {
    format!(
        "Theme:   {}\nSidebar: {}",
        p.theme,
        if p.sidebar_collapsed { "collapsed" } else { "expanded" }
    )
}

pub fn handle(dashboard: &Dashboard, args: PrefsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = dashboard.session();

    match args.command {
        PrefsCommand::Show => {}
        PrefsCommand::Theme { theme } => session.set_theme(match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }),
        PrefsCommand::ToggleTheme => session.toggle_theme(),
        PrefsCommand::Sidebar { state: None } => session.toggle_sidebar(),
        PrefsCommand::Sidebar { state: Some(state) } => {
            session.set_sidebar_collapsed(matches!(state, SidebarArg::Collapsed));
        }
    }

    let prefs = Prefs {
        theme: session.theme(),
        sidebar_collapsed: session.sidebar_collapsed(),
    };
    let out = output::render_single(&global.output, &prefs, detail, |p| p.theme.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
