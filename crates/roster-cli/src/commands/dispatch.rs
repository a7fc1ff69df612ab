use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Init(args) => commands::recruitment::init(&args, ctx, flags).await,
        Commands::GoLive(args) => commands::recruitment::go_live(&args, ctx, flags).await,
        Commands::OpenWindow(args) => commands::recruitment::open_window(&args, ctx, flags).await,
        Commands::CloseWindow(args) => commands::recruitment::close_window(&args, ctx, flags).await,
        Commands::Enroll(args) => commands::recruitment::enroll(&args, ctx, flags).await,
        Commands::Waitlist(args) => commands::recruitment::waitlist(&args, ctx, flags).await,
        Commands::Track(args) => commands::shipping::track(&args, ctx, flags).await,
        Commands::Deliver(args) => commands::shipping::deliver(&args, ctx, flags).await,
        Commands::Status(args) => commands::query::status(&args, ctx, flags).await,
        Commands::List(args) => commands::query::list(&args, ctx, flags).await,
        Commands::Due => commands::query::due(ctx, flags).await,
        Commands::Participants(args) => commands::query::participants(&args, ctx, flags).await,
        Commands::Progress(args) => commands::query::progress(&args, ctx, flags).await,
    }
}
