pub mod opt;

use anyhow::{Context, Result, bail};
use console::Term;
use coursedesk_cli::debounce::{Debouncer, SEARCH_DELAY};
use coursedesk_cli::render::{render_collection, render_table};
use coursedesk_cli::resource::{Child, Collection};
use coursedesk_cli::store::Rows;
use coursedesk_cli::{ApiClient, ClientError, ListQuery, Store, table};
use dialoguer::{Confirm, Password};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use opt::{Add, Commands, Edit, List, Parent};

pub async fn exec(client: ApiClient, command: Commands) -> Result<()> {
    match command {
        Commands::List(list) => list_collection(&client, list).await,
        Commands::Get { collection, id } => {
            let record: Value = client
                .get(collection, id)
                .await
                .with_context(|| format!("Failed to load {} {id}", collection.noun()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Add(add) => add_record(&client, add).await,
        Commands::Edit(edit) => edit_record(&client, edit).await,
        Commands::Delete { target, id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete {} {id}?", target.noun()))
                    .default(false)
                    .interact()?
            {
                println!("Aborted");
                return Ok(());
            }
            let message = client
                .delete(target.endpoint(), id)
                .await
                .context("Delete failed")?;
            println!("{message}");
            Ok(())
        }
        Commands::Comments { parent, id } => {
            let out = match parent {
                Parent::Assignment => render_table(&client.assignment_comments(id).await?, None),
                Parent::Week => render_table(&client.week_comments(id).await?, None),
            };
            print!("{out}");
            Ok(())
        }
        Commands::Comment { parent, id, post } => {
            let child = parent.child();
            let new_id = client
                .add_child(child, id, &post.author, &post.text)
                .await
                .context("Failed to post comment")?;
            println!("Created {} {new_id}", child.noun());
            Ok(())
        }
        Commands::Replies { topic_id } => {
            print!("{}", render_table(&client.replies(topic_id).await?, None));
            Ok(())
        }
        Commands::Reply { topic_id, post } => {
            let new_id = client
                .add_child(Child::Replies, topic_id, &post.author, &post.text)
                .await
                .context("Failed to post reply")?;
            println!("Created reply {new_id}");
            Ok(())
        }
        Commands::Passwd { id, current, new } => {
            let current = match current {
                Some(current) => current,
                None => Password::new().with_prompt("Current password").interact()?,
            };
            let new = match new {
                Some(new) => new,
                None => Password::new()
                    .with_prompt("New password")
                    .with_confirmation("Repeat new password", "Passwords do not match")
                    .interact()?,
            };
            let message = client
                .change_password(id, &current, &new)
                .await
                .context("Password change failed")?;
            println!("{message}");
            Ok(())
        }
        Commands::Browse { collection } => browse(client, collection).await,
    }
}

async fn list_collection(client: &ApiClient, list: List) -> Result<()> {
    let query = ListQuery {
        search: list.search,
        sort: list.sort,
        order: list.order,
    };
    let mut store = Store::new();
    store.apply(
        client
            .fetch(list.collection, &query)
            .await
            .with_context(|| format!("Failed to list {:?}", list.collection))?,
    );
    print!("{}", render_collection(&store, list.collection));
    Ok(())
}

async fn add_record(client: &ApiClient, add: Add) -> Result<()> {
    let (collection, body) = match add {
        Add::Student {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?,
            };
            (
                Collection::Students,
                json!({ "name": name, "email": email, "password": password }),
            )
        }
        Add::Assignment {
            title,
            description,
            due_date,
            files,
        } => (
            Collection::Assignments,
            json!({
                "title": title,
                "description": description,
                "due_date": due_date,
                "files": files,
            }),
        ),
        Add::Week {
            title,
            start_date,
            description,
            links,
        } => (
            Collection::Weeks,
            json!({
                "title": title,
                "start_date": start_date,
                "description": description,
                "links": links,
            }),
        ),
        Add::Topic {
            subject,
            message,
            author,
        } => (
            Collection::Topics,
            json!({ "subject": subject, "message": message, "author": author }),
        ),
    };
    let id = client
        .create(collection, &body)
        .await
        .with_context(|| format!("Failed to create {}", collection.noun()))?;
    println!("Created {} {id}", collection.noun());
    Ok(())
}

async fn edit_record(client: &ApiClient, edit: Edit) -> Result<()> {
    let mut fields = Map::new();
    let (collection, id) = match edit {
        Edit::Student { id, name, email } => {
            put(&mut fields, "name", name);
            put(&mut fields, "email", email);
            (Collection::Students, id)
        }
        Edit::Assignment {
            id,
            title,
            description,
            due_date,
            files,
        } => {
            put(&mut fields, "title", title);
            put(&mut fields, "description", description);
            put(&mut fields, "due_date", due_date);
            put(&mut fields, "files", files);
            (Collection::Assignments, id)
        }
        Edit::Week {
            id,
            title,
            start_date,
            description,
            links,
        } => {
            put(&mut fields, "title", title);
            put(&mut fields, "start_date", start_date);
            put(&mut fields, "description", description);
            put(&mut fields, "links", links);
            (Collection::Weeks, id)
        }
        Edit::Topic {
            id,
            subject,
            message,
        } => {
            put(&mut fields, "subject", subject);
            put(&mut fields, "message", message);
            (Collection::Topics, id)
        }
    };
    if fields.is_empty() {
        bail!("Nothing to change; pass at least one field");
    }
    let record: Value = client
        .update(collection, id, Value::Object(fields))
        .await
        .with_context(|| format!("Failed to update {} {id}", collection.noun()))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn put<T: Into<Value>>(fields: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), value.into());
    }
}

fn spawn_fetch(
    client: &ApiClient,
    collection: Collection,
    query: ListQuery,
    tx: &mpsc::UnboundedSender<Result<Rows, ClientError>>,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(client.fetch(collection, &query).await);
    });
}

fn redraw(term: &Term, store: &Store, collection: Collection, query: &ListQuery) -> Result<()> {
    term.clear_screen()?;
    term.write_line(&format!(
        "{} {} | search: {}",
        store.len(collection),
        collection.noun(),
        query.search.as_deref().unwrap_or("-")
    ))?;
    term.write_str(&render_collection(store, collection))?;
    term.write_line("type to search, :sort <column>, :q to quit")?;
    Ok(())
}

/// Debounced interactive search. Fetches are never cancelled and the
/// latest response to arrive wins.
async fn browse(client: ApiClient, collection: Collection) -> Result<()> {
    let term = Term::stdout();
    let mut store = Store::new();
    let mut query = ListQuery::default();
    let (mut debouncer, mut searches) = Debouncer::new(SEARCH_DELAY);
    let (results_tx, mut results) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    spawn_fetch(&client, collection, query.clone(), &results_tx);
    redraw(&term, &store, collection, &query)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line == ":q" {
                    break;
                }
                if let Some(column) = line.strip_prefix(":sort") {
                    let column = column.trim();
                    if !table::columns(collection).contains(&column) {
                        tracing::warn!(column, "Unknown column");
                        continue;
                    }
                    let order = store.toggle_sort(collection, column);
                    if collection.server_sort_keys().contains(&column) {
                        query.sort = Some(column.to_string());
                        query.order = Some(order);
                        spawn_fetch(&client, collection, query.clone(), &results_tx);
                    }
                    redraw(&term, &store, collection, &query)?;
                } else {
                    debouncer.push(line.to_string());
                }
            }
            Some(term_text) = searches.recv() => {
                query.search = (!term_text.is_empty()).then_some(term_text);
                spawn_fetch(&client, collection, query.clone(), &results_tx);
            }
            Some(result) = results.recv() => match result {
                Ok(rows) => {
                    store.apply(rows);
                    redraw(&term, &store, collection, &query)?;
                }
                Err(e) => tracing::warn!(error = %e, "Fetch failed"),
            },
        }
    }
    Ok(())
}
