//! Post command handlers.

use tabled::Tabled;

use postdesk_core::{
    CoreError, Dashboard, PostCreateUpdate, PostDetail, PostListItem, PostListView, PostPatch,
    StatusFilter,
};

use crate::cli::{GlobalOpts, OutputFormat, PostsArgs, PostsCommand, StatusArg};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PostRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Comments")]
    comments: u64,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl PostRow {
    fn new(p: &PostListItem, color: bool) -> Self {
        Self {
            id: p.id,
            title: output::truncate(&p.title, 48),
            author: p.author.username.clone(),
            status: output::status_label(p.is_published, color),
            comments: p.comment_count,
            updated: p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn detail(p: &PostDetail) -> String {
    let mut lines = vec![
        format!("ID:       {}", p.id),
        format!("Title:    {}", p.title),
        format!("Author:   {}", p.author.username),
        format!("Status:   {}", output::status_label(p.is_published, false)),
        format!("Created:  {}", p.created_at.format("%Y-%m-%d %H:%M")),
        format!("Updated:  {}", p.updated_at.format("%Y-%m-%d %H:%M")),
        String::new(),
        p.content.clone(),
    ];
    if !p.comments.is_empty() {
        lines.push(String::new());
        lines.push(format!("Comments ({}):", p.comments.len()));
        for c in &p.comments {
            lines.push(format!(
                "  #{} {} ({}): {}",
                c.id,
                c.author.username,
                c.created_at.format("%Y-%m-%d"),
                c.content
            ));
        }
    }
    lines.join("\n")
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Published => Self::Published,
            StatusArg::Draft => Self::Draft,
        }
    }
}

/// Only the flags that were given, with `--publish`/`--draft` mapped
/// onto `is_published`.
fn build_patch(
    title: Option<String>,
    content: Option<String>,
    publish: bool,
    draft: bool,
) -> Result<PostPatch, CliError> {
    let is_published = match (publish, draft) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let patch = PostPatch {
        title,
        content,
        is_published,
    };
    if patch.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "nothing to change; pass --title, --content, --publish or --draft".into(),
        });
    }
    Ok(patch)
}

/// "Showing" compares against the fetched page; the server total only
/// feeds the pager.
fn footer(view: &PostListView) -> String {
    format!(
        "Showing {} of {} posts (page {}/{}, {} total)",
        view.showing,
        view.page_rows,
        view.page,
        view.page_count.max(1),
        view.total_count
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(dashboard: &Dashboard, args: PostsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(dashboard)?;
    let posts = dashboard.posts();
    let mut notes = dashboard.subscribe_notifications();

    let result = match args.command {
        PostsCommand::List { page, search, status } => {
            posts.set_page(page).await?;

            let filters = dashboard.filters().activate();
            filters.set_search_query(search.unwrap_or_default());
            filters.set_status_filter(status.into());

            let view = posts
                .view(&filters.filter())
                .ok_or_else(|| CliError::Internal("post list not loaded".into()))?;

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &view.posts,
                |p| PostRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);

            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                eprintln!("{}", footer(&view));
            }
            Ok(())
        }

        PostsCommand::Get { id } => {
            let post = dashboard
                .client()
                .get_post(id)
                .await
                .map_err(CoreError::from)?;
            let out = output::render_single(&global.output, &post, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PostsCommand::Create {
            title,
            content,
            publish,
        } => {
            posts.open_create_modal();
            let values = PostCreateUpdate {
                title,
                content,
                is_published: publish,
            };
            posts.create(&values).await.map(|_| ()).map_err(CliError::from)
        }

        PostsCommand::Update {
            id,
            title,
            content,
            publish,
            draft,
        } => {
            let patch = build_patch(title, content, publish, draft)?;
            posts.patch(id, &patch).await.map(|_| ()).map_err(CliError::from)
        }

        PostsCommand::Replace {
            id,
            title,
            content,
            publish,
        } => {
            let values = PostCreateUpdate {
                title,
                content,
                is_published: publish,
            };
            posts.replace(id, &values).await.map(|_| ()).map_err(CliError::from)
        }

        PostsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete post {id}? This cannot be undone."), global.yes)? {
                return Ok(());
            }
            posts.delete(id).await.map_err(CliError::from)
        }
    };

    util::drain_notifications(&mut notes, global.quiet);
    result
}
