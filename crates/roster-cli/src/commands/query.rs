use roster_core::enums::RecruitmentStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{CohortArgs, ListArgs, StudyArgs};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roster status`.
pub async fn status(args: &StudyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.service.get_recruitment_state(&args.study_id).await?;
    output(&state, flags.format)
}

/// Handle `roster list`.
pub async fn list(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = args
        .status
        .as_deref()
        .map(|value| parse_enum::<RecruitmentStatus>(value, "status"))
        .transpose()?;
    let limit = effective_limit(args.limit, flags.limit, ctx.config.general.default_limit);

    let states = ctx.service.list_recruitment_states(status, limit).await?;

    output(&states, flags.format)
}

/// Handle `roster due`.
pub async fn due(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let due = ctx.service.list_due_windows(ctx.service.now()).await?;
    output(&due, flags.format)
}

/// Handle `roster participants`.
pub async fn participants(
    args: &CohortArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let participants = ctx.service.get_cohort_participants(&args.cohort_id).await?;
    output(&participants, flags.format)
}

/// Handle `roster progress`.
pub async fn progress(args: &CohortArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let progress = ctx.service.cohort_progress(&args.cohort_id).await?;
    output(&progress, flags.format)
}
