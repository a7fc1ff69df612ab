use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize recruitment for a study (no-op if it already exists).
    Init(InitArgs),
    /// Open a study's first recruitment window.
    GoLive(StudyArgs),
    /// Open the next recruitment window once the current cohort has shipped.
    OpenWindow(StudyArgs),
    /// Close the open window and form a cohort from its enrollees.
    CloseWindow(StudyArgs),
    /// Enroll waitlisted participants into the open window.
    Enroll(CountArgs),
    /// Grow a study's waitlist.
    Waitlist(CountArgs),
    /// Enter a participant's tracking code.
    Track(TrackArgs),
    /// Confirm a shipped participant's delivery.
    Deliver(ParticipantArgs),
    /// Show a study's recruitment state.
    Status(StudyArgs),
    /// List studies, most recently updated first.
    List(ListArgs),
    /// List studies whose recruitment window deadline has passed.
    Due,
    /// List a cohort's participants.
    Participants(CohortArgs),
    /// Show a cohort's fulfillment progress.
    Progress(CohortArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Study identifier.
    pub study_id: String,
    /// Number of participants the study needs.
    #[arg(long)]
    pub target: u32,
    /// Starting waitlist size (defaults to `recruitment.default_waitlist`).
    #[arg(long)]
    pub waitlist: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Only studies in this status (e.g. `window_open`).
    #[arg(long)]
    pub status: Option<String>,
    /// Max studies to return (overrides the global `--limit`).
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct StudyArgs {
    /// Study identifier.
    pub study_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct CountArgs {
    /// Study identifier.
    pub study_id: String,
    /// How many participants.
    pub count: u32,
}

#[derive(Clone, Debug, Args)]
pub struct TrackArgs {
    /// Study identifier.
    pub study_id: String,
    /// Participant identifier, e.g. `s1-cohort-1-p0`.
    pub participant_id: String,
    /// Carrier tracking number.
    pub tracking_number: String,
}

#[derive(Clone, Debug, Args)]
pub struct ParticipantArgs {
    /// Study identifier.
    pub study_id: String,
    /// Participant identifier.
    pub participant_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct CohortArgs {
    /// Cohort identifier, e.g. `s1-cohort-1`.
    pub cohort_id: String,
}
