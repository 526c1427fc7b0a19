//! Public portal handlers. These work without a session.

use tabled::Tabled;

use postdesk_core::{Dashboard, PublicPostDetail, PublicPostListItem};

use crate::cli::{GlobalOpts, OutputFormat, PortalArgs, PortalCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PublicPostRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Comments")]
    comments: u64,
    #[tabled(rename = "Published")]
    created: String,
}

impl From<&PublicPostListItem> for PublicPostRow {
    fn from(p: &PublicPostListItem) -> Self {
        Self {
            id: p.id,
            title: output::truncate(&p.title, 60),
            author: p.author.username.clone(),
            comments: p.comment_count,
            created: p.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn detail(p: &PublicPostDetail) -> String {
    let mut lines = vec![
        p.title.clone(),
        format!("by {} on {}", p.author.username, p.created_at.format("%Y-%m-%d")),
        String::new(),
        p.content.clone(),
    ];
    if !p.comments.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} comment(s):", p.comments.len()));
        for c in &p.comments {
            lines.push(format!("  {}: {}", c.author.username, c.content));
        }
    }
    lines.join("\n")
}

pub async fn handle(
    dashboard: &Dashboard,
    args: PortalArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let portal = dashboard.portal();

    match args.command {
        PortalCommand::List { page } => {
            let data = portal.set_page(page).await?;
            let out = output::render_list(
                &global.output,
                &data.results,
                |p| PublicPostRow::from(p),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                eprintln!(
                    "Page {}/{} ({} posts)",
                    portal.page(),
                    data.page_count().max(1),
                    data.count
                );
            }
            Ok(())
        }

        PortalCommand::Get { id } => {
            let post = portal.post(id).await?;
            let out = output::render_single(&global.output, &post, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
