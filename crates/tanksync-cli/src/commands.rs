//! Main commands enum.

use clap::Subcommand;

/// Available commands.
///
/// Collections are named as stored: `knowledge`, `news`, `market`,
/// `status`, `watchlist`, `remarks`, `spoken_news`.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved data directory and store locations
    Paths,

    /// Post a news item (skipped if the same title and source exist)
    PostNews {
        /// Headline
        title: String,
        /// Publisher shown alongside the headline
        #[arg(short, long, default_value = "cli")]
        source: String,
        /// Body text
        #[arg(short, long)]
        content: Option<String>,
        /// Link to the full article
        #[arg(long)]
        url: Option<String>,
    },

    /// Add a short remark
    Remark {
        /// Remark text
        text: String,
        #[arg(short, long, default_value = "cli")]
        source: String,
    },

    /// Put one or more symbols at the front of the shared watchlist
    WatchAdd {
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Remove a symbol from the shared watchlist
    WatchRemove { symbol: String },

    /// Print the current contents of a collection
    Show {
        /// Collection name
        collection: String,
        /// Show at most this many records (newest first)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Check or set whether an item has been announced
    Spoken {
        /// Item id
        id: String,
        /// Record the item as announced
        #[arg(long)]
        mark: bool,
    },

    /// Print every change to a collection until interrupted
    Follow {
        /// Collection name
        collection: String,
        /// Read new news and knowledge items aloud on the console
        #[arg(long)]
        announce: bool,
    },
}
