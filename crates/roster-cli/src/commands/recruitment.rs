//! Recruitment lifecycle commands.

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{CountArgs, InitArgs, StudyArgs};
use crate::context::AppContext;
use crate::output::output;

/// Handle `roster init`.
pub async fn init(args: &InitArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx
        .service
        .initialize_study(&args.study_id, args.target, args.waitlist)
        .await?;
    tracing::info!(
        study_id = %state.study_id,
        project_root = %ctx.project_root.display(),
        "study initialized"
    );
    output(&state, flags.format)
}

/// Handle `roster go-live`.
pub async fn go_live(args: &StudyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.service.go_live(&args.study_id).await?;
    output(&state, flags.format)
}

/// Handle `roster open-window`.
pub async fn open_window(
    args: &StudyArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let state = ctx.service.open_window(&args.study_id).await?;
    output(&state, flags.format)
}

/// Handle `roster close-window`.
pub async fn close_window(
    args: &StudyArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let state = ctx.service.close_window(&args.study_id).await?;
    output(&state, flags.format)
}

/// Handle `roster enroll`.
pub async fn enroll(args: &CountArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = ctx.service.enroll(&args.study_id, args.count).await?;
    if response.accepted < args.count {
        tracing::info!(
            study_id = %args.study_id,
            requested = args.count,
            accepted = response.accepted,
            "enrollment capped at remaining seats"
        );
    }
    output(&response, flags.format)
}

/// Handle `roster waitlist`.
pub async fn waitlist(args: &CountArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.service.grow_waitlist(&args.study_id, args.count).await?;
    output(&state, flags.format)
}
