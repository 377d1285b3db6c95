use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use features_list::{
    ActivityKind, FeaturesList, HostView, InitOptions, ItemInfo, ListOptions, NavigationTarget,
    SelectionListener, ViewError, ViewSelection,
};
use foundation::ids::FeatureId;
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use layers::gateway::QueryGateway;
use layers::layer::StoreId;
use layers::memory::MemoryStore;
use layers::query::QueryOverrides;
use layers::record::FeatureRecord;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a synchronized feature list over a JSON store fixture")]
struct Args {
    /// Store fixture: {id, title, maxRecordCount, features}
    #[arg(long)]
    store: PathBuf,

    /// List options JSON file (container, selectActivity, actionActivity)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Overrides the select activity from --options (none, goto, popup, event)
    #[arg(long)]
    select_activity: Option<ActivityKind>,

    /// Overrides the action activity from --options
    #[arg(long)]
    action_activity: Option<ActivityKind>,

    /// Query overrides as JSON, e.g. '{"returnGeometry": true}'
    #[arg(long)]
    query_params: Option<String>,

    /// Attribute shown as the item label
    #[arg(long, default_value = "name")]
    label_field: String,

    /// Attribute shown as the item description
    #[arg(long, default_value = "status")]
    description_field: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the list items
    List {
        /// Client-side filter text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Select a row as the user would
    Select { value: String },

    /// Click a row's action control
    Action { value: String },

    /// Navigate the view to a feature
    Goto { id: String },

    /// Select a feature on the view and print the mirrored list selection
    ViewSelect {
        id: Option<String>,

        /// Owning store; defaults to the fixture's store
        #[arg(long)]
        store_id: Option<u64>,
    },
}

/// Host view that reports movements and details on stdout.
#[derive(Default)]
struct ConsoleView {
    listener: RefCell<Option<SelectionListener>>,
}

impl ConsoleView {
    fn select(&self, selection: Option<&ViewSelection>) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(selection);
        }
    }
}

impl HostView for ConsoleView {
    fn watch_selection(&self, listener: SelectionListener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    fn move_to(&self, target: NavigationTarget) -> LocalBoxFuture<'_, Result<(), ViewError>> {
        info!(?target, "moving view");
        println!("{}", json!({ "moveTo": target }));
        future::ready(Ok(())).boxed_local()
    }

    fn open_detail(&self, records: Vec<FeatureRecord>) {
        info!(count = records.len(), "opening detail");
        println!("{}", json!({ "openDetail": records }));
    }

    fn close_detail(&self) {
        info!("closing detail");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.store)
        .with_context(|| format!("reading store fixture {}", args.store.display()))?;
    let store = MemoryStore::from_json(&text).context("parsing store fixture")?;
    let store_id = store.id;

    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading options {}", path.display()))?;
            ListOptions::from_json(&text)?
        }
        None => ListOptions::default(),
    };
    if let Some(activity) = args.select_activity {
        options.select_activity = activity;
    }
    if let Some(activity) = args.action_activity {
        options.action_activity = activity;
    }

    let query_params: QueryOverrides = match &args.query_params {
        Some(text) => serde_json::from_str(text).context("parsing --query-params")?,
        None => QueryOverrides::default(),
    };

    let view = Rc::new(ConsoleView::default());
    let list = FeaturesList::new(options, view.clone());
    let (label_field, description_field) = (args.label_field, args.description_field);
    let store: Rc<dyn QueryGateway> = Rc::new(store);
    list.initialize(InitOptions {
        store: Some(store),
        query_params,
        formatter: Some(Rc::new(move |record: &FeatureRecord| ItemInfo {
            label: record.attribute_text(&label_field),
            description: record.attribute_text(&description_field),
            value: record.identity.to_string(),
        })),
    })
    .await?;

    match args.command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                list.set_filter_text(filter);
            }
            println!(
                "{}",
                json!({
                    "placeholder": list.filter_placeholder(),
                    "items": list.visible_items(),
                })
            );
        }
        Command::Select { value } => {
            list.on_list_selection_changed(&[value]).await?;
            print_selection(&list);
        }
        Command::Action { value } => list.on_action(&value).await?,
        Command::Goto { id } => {
            let target = list.go_to(&parse_identity(&id)).await?;
            info!(?target, "navigation finished");
        }
        Command::ViewSelect { id, store_id: owner } => {
            let selection = id.map(|id| {
                let owner = owner.map(StoreId).unwrap_or(store_id);
                ViewSelection::new(owner, parse_identity(&id))
            });
            view.select(selection.as_ref());
            print_selection(&list);
        }
    }

    for event in list.drain_events() {
        println!("{}", json!({ "sequence": event.sequence, "event": event.payload }));
    }
    Ok(())
}

fn print_selection(list: &FeaturesList) {
    let state = format!("{:?}", list.selection_state());
    println!("{}", json!({ "selected": list.selected_value(), "state": state }));
}

/// Integer ids when the text parses as one, string keys otherwise.
fn parse_identity(text: &str) -> FeatureId {
    text.parse::<i64>()
        .map(FeatureId::Int)
        .unwrap_or_else(|_| FeatureId::from(text))
}
