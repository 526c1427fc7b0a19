//! Comment command handlers.

use tabled::Tabled;

use postdesk_core::{Comment, CommentCreate, CoreError, Dashboard};

use crate::cli::{CommentsArgs, CommentsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Post")]
    post: i64,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Comment")]
    content: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            post: c.post,
            author: c.author.username.clone(),
            content: output::truncate(&c.content, 60),
            created: c.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn detail(c: &Comment) -> String {
    [
        format!("ID:       {}", c.id),
        format!("Post:     {}", c.post),
        format!("Author:   {}", c.author.username),
        format!("Created:  {}", c.created_at.format("%Y-%m-%d %H:%M")),
        String::new(),
        c.content.clone(),
    ]
    .join("\n")
}

pub async fn handle(
    dashboard: &Dashboard,
    args: CommentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_login(dashboard)?;
    let client = dashboard.client();

    match args.command {
        CommentsCommand::List { page } => {
            let data = client
                .list_comments(page.max(1))
                .await
                .map_err(CoreError::from)?;
            let out = output::render_list(
                &global.output,
                &data.results,
                |c| CommentRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if !global.quiet && matches!(global.output, OutputFormat::Table) {
                eprintln!(
                    "{} of {} comments (page {}/{})",
                    data.results.len(),
                    data.count,
                    page.max(1),
                    data.page_count().max(1)
                );
            }
            Ok(())
        }

        CommentsCommand::Get { id } => {
            let comment = client.get_comment(id).await.map_err(CoreError::from)?;
            let out = output::render_single(&global.output, &comment, detail, |c| c.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CommentsCommand::Create { post, content } => {
            if content.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "content".into(),
                    reason: "comment cannot be empty".into(),
                });
            }
            client
                .create_comment(&CommentCreate { post, content })
                .await
                .map_err(CoreError::from)?;
            if !global.quiet {
                eprintln!("✓ Comment added to post {post}");
            }
            Ok(())
        }

        CommentsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete comment {id}?"), global.yes)? {
                return Ok(());
            }
            client.delete_comment(id).await.map_err(CoreError::from)?;
            if !global.quiet {
                eprintln!("✓ Comment deleted");
            }
            Ok(())
        }
    }
}
