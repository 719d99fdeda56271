//! `hd comment`: append a comment. Comments never bump the version, so
//! they need no `--expect-version`.

use std::path::Path;

use clap::Args;
use helpdesk_core::Comment;
use serde::Serialize;

use crate::cmd::{Context, open_ticket};
use crate::output::render;

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    /// Comment text.
    pub body: String,
}

#[derive(Debug, Serialize)]
struct CommentOutput {
    ticket_id: String,
    #[serde(flatten)]
    comment: Comment,
}

pub fn run_comment(args: &CommentArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let author = ctx.require_actor()?;
    let (desk, id) = open_ticket(project_root, &args.id)?;
    let comment = desk.add_comment(&id, author, &args.body)?;

    let out = CommentOutput {
        ticket_id: id.to_string(),
        comment,
    };
    render(ctx.output, &out, |o, w| {
        writeln!(w, "{} commented on {}", o.comment.author, o.ticket_id)
    })
}
