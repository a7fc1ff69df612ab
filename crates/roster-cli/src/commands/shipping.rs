use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ParticipantArgs, TrackArgs};
use crate::context::AppContext;
use crate::output::output;

/// Handle `roster track`.
pub async fn track(args: &TrackArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = ctx
        .service
        .enter_tracking_code(&args.study_id, &args.participant_id, &args.tracking_number)
        .await?;
    output(&response, flags.format)
}

/// Handle `roster deliver`.
pub async fn deliver(
    args: &ParticipantArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let participant = ctx
        .service
        .mark_delivered(&args.study_id, &args.participant_id)
        .await?;
    output(&participant, flags.format)
}
