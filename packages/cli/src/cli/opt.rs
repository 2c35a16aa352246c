use clap::{Args, Parser, Subcommand, ValueEnum};
use common::SortOrder;
use coursedesk_cli::client::DEFAULT_BASE_URL;
use coursedesk_cli::resource::{Child, Collection, Endpoint};

#[derive(Parser)]
#[command(name = "coursedesk", about = "Terminal client for the course server")]
pub struct Cli {
    #[arg(long, env = "COURSEDESK_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a collection as a table.
    List(List),
    /// Print one record as JSON.
    Get {
        collection: Collection,
        id: i32,
    },
    #[command(subcommand)]
    Add(Add),
    #[command(subcommand)]
    Edit(Edit),
    Delete {
        target: Target,
        id: i32,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// List the comments of an assignment or week.
    Comments { parent: Parent, id: i32 },
    /// Comment on an assignment or week.
    Comment {
        parent: Parent,
        id: i32,
        #[command(flatten)]
        post: Post,
    },
    /// List the replies of a topic.
    Replies { topic_id: i32 },
    Reply {
        topic_id: i32,
        #[command(flatten)]
        post: Post,
    },
    /// Change a student's password. Prompts for anything not given.
    Passwd {
        id: i32,
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        new: Option<String>,
    },
    /// Interactive search: type to filter, `:sort <column>` to toggle, `:q` to quit.
    Browse { collection: Collection },
}

#[derive(Args)]
pub struct List {
    pub collection: Collection,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, value_parser = parse_order)]
    pub order: Option<SortOrder>,
}

#[derive(Args)]
pub struct Post {
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub text: String,
}

#[derive(Subcommand)]
pub enum Add {
    Student {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    Assignment {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// `YYYY-MM-DD`
        #[arg(long)]
        due_date: String,
        #[arg(long = "file")]
        files: Vec<String>,
    },
    Week {
        #[arg(long)]
        title: String,
        /// `YYYY-MM-DD`
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        description: String,
        #[arg(long = "link")]
        links: Vec<String>,
    },
    Topic {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        author: String,
    },
}

#[derive(Subcommand)]
pub enum Edit {
    Student {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Assignment {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
        /// Replaces the whole list when given.
        #[arg(long = "file")]
        files: Option<Vec<String>>,
    },
    Week {
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "link")]
        links: Option<Vec<String>>,
    },
    Topic {
        id: i32,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Parent {
    Assignment,
    Week,
}

impl Parent {
    pub fn child(self) -> Child {
        match self {
            Parent::Assignment => Child::AssignmentComments,
            Parent::Week => Child::WeekComments,
        }
    }
}

/// Anything that can be deleted by id.
#[derive(Clone, Copy, ValueEnum)]
pub enum Target {
    Student,
    Assignment,
    Week,
    Topic,
    AssignmentComment,
    WeekComment,
    Reply,
}

impl Target {
    pub fn endpoint(self) -> Endpoint {
        match self {
            Target::Student => Collection::Students.endpoint(),
            Target::Assignment => Collection::Assignments.endpoint(),
            Target::Week => Collection::Weeks.endpoint(),
            Target::Topic => Collection::Topics.endpoint(),
            Target::AssignmentComment => Child::AssignmentComments.endpoint(),
            Target::WeekComment => Child::WeekComments.endpoint(),
            Target::Reply => Child::Replies.endpoint(),
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Target::Student => "student",
            Target::Assignment => "assignment and all of its comments",
            Target::Week => "week and all of its comments",
            Target::Topic => "topic and all of its replies",
            Target::AssignmentComment | Target::WeekComment => "comment",
            Target::Reply => "reply",
        }
    }
}

fn parse_order(raw: &str) -> Result<SortOrder, String> {
    raw.parse()
}
