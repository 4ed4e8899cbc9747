use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::{AddArgs, ListArgs};
use crate::client::UserSource;
use crate::error::Result;
use crate::lookup::{LookupState, UserLookup};
use crate::output::{self, heading, label, muted, or_placeholder, truncate};
use crate::repository::UserRepository;
use crate::search::{filter_users, found_summary, showing_summary, Debouncer};
use crate::store::KeyValueStore;
use crate::types::{NewUser, User};
use crate::validate::validate_new_user;

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
enum Source {
    Local,
    Api,
}

impl Source {
    fn label(self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Api => "api",
        }
    }
}

/// A user tagged with where it came from, for listing.
#[derive(Serialize)]
struct ListedUser {
    #[serde(flatten)]
    user: User,
    source: Source,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Source")]
    source: &'static str,
}

impl From<&ListedUser> for UserRow {
    fn from(listed: &ListedUser) -> Self {
        let user = &listed.user;
        Self {
            id: user.id,
            name: truncate(&user.name, 30),
            email: truncate(&user.email, 30),
            phone: user.phone.clone(),
            company: truncate(or_placeholder(user.company_name(), "N/A"), 30),
            source: listed.source.label(),
        }
    }
}

fn compact_line(listed: &ListedUser) -> String {
    let user = &listed.user;
    format!(
        "{}\t{}\t{}\t{}",
        user.id,
        user.name,
        user.email,
        listed.source.label()
    )
}

impl AsRef<User> for ListedUser {
    fn as_ref(&self) -> &User {
        &self.user
    }
}

/// Tag each user with its provenance. Local users come first in the merged
/// collection, so the first `local_count` entries are local.
fn tag_users(users: Vec<User>, local_count: usize) -> Vec<ListedUser> {
    users
        .into_iter()
        .enumerate()
        .map(|(index, user)| ListedUser {
            user,
            source: if index < local_count {
                Source::Local
            } else {
                Source::Api
            },
        })
        .collect()
}

/// The lines above the results table, or the empty state when nothing matched.
fn write_summary(out: &mut impl Write, matching: usize, query: &str) -> io::Result<()> {
    if let Some(summary) = found_summary(matching, query) {
        writeln!(out, "{}", muted(&summary))?;
    }

    if matching == 0 {
        writeln!(out, "{}", heading("No users found"))?;
        writeln!(
            out,
            "We couldn't find anyone matching your search. Try different keywords!"
        )?;
        return Ok(());
    }

    writeln!(out, "{}", showing_summary(matching))
}

fn render_results(users: &[User], local_count: usize, query: &str) {
    let listed = tag_users(users.to_vec(), local_count);
    let matching = filter_users(&listed, query);

    if !output::is_json_output() {
        // A closed stdout is not worth failing the view over.
        let _ = write_summary(&mut io::stdout().lock(), matching.len(), query);
        if matching.is_empty() {
            return;
        }
    }

    output::print_table(&matching, |l| UserRow::from(*l), |l| compact_line(l));
}

pub async fn list<S, K>(repository: &UserRepository<S, K>, args: ListArgs) -> Result<()>
where
    S: UserSource,
    K: KeyValueStore,
{
    if let Some(error) = repository.error() {
        output::print_error(&error);
    }

    let (users, local_count) = if args.local {
        let local = repository.local_users();
        let count = local.len();
        (local, count)
    } else if args.remote {
        (repository.remote_users(), 0)
    } else {
        (repository.users(), repository.local_users().len())
    };

    render_results(&users, local_count, args.search.as_deref().unwrap_or(""));

    Ok(())
}

pub async fn show<S, K>(repository: &UserRepository<S, K>, id: &str) -> Result<()>
where
    S: UserSource,
    K: KeyValueStore,
{
    let mut lookup = UserLookup::new();

    match lookup.resolve(repository, id).await {
        LookupState::Found(user) => output::print_item(user, print_details),
        LookupState::Failed(message) => output::print_error(message),
    }

    Ok(())
}

fn print_details(user: &User) {
    println!("{}  {}", label(&format!("[{}]", user.initials())), heading(&user.name));
    println!(
        "{}",
        muted(&format!("@{}", or_placeholder(user.username.as_deref(), "user")))
    );
    println!();

    println!("{}", heading("Contact Information"));
    println!("  Email:    {}", user.email);
    println!("  Phone:    {}", user.phone);
    println!(
        "  Website:  {}",
        or_placeholder(user.website.as_deref(), "Not available")
    );

    if let Some(address) = &user.address {
        println!();
        println!("{}", heading("Address"));
        println!(
            "  Street:   {} {}",
            or_placeholder(Some(address.street.as_str()), "N/A"),
            address.suite
        );
        println!("  City:     {}", or_placeholder(Some(address.city.as_str()), "N/A"));
        println!("  Zipcode:  {}", or_placeholder(Some(address.zipcode.as_str()), "N/A"));
    }

    println!();
    println!("{}", heading("Company"));
    println!("  Name:     {}", or_placeholder(user.company_name(), "N/A"));
    if let Some(company) = &user.company {
        if let Some(catch_phrase) = &company.catch_phrase {
            println!("  Catchphrase: {catch_phrase}");
        }
        if let Some(bs) = &company.bs {
            println!("  Business: {bs}");
        }
    }
}

pub async fn add<S, K>(repository: &UserRepository<S, K>, args: AddArgs) -> Result<()>
where
    S: UserSource,
    K: KeyValueStore,
{
    let candidate = NewUser {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        phone: args.phone.trim().to_string(),
        company: args.company.trim().to_string(),
    };
    validate_new_user(&candidate)?;

    let user = repository.add(candidate);

    if output::is_json_output() {
        output::print_item(&user, |_| {});
    } else {
        output::print_message(&format!(
            "User added successfully: {} - {}",
            user.id, user.name
        ));
    }

    Ok(())
}

/// Repository state captured when a debounced query fires.
struct SearchView {
    query: String,
    loading: bool,
    error: Option<String>,
    users: Vec<User>,
    local_count: usize,
}

impl SearchView {
    fn capture<S: UserSource, K: KeyValueStore>(
        repository: &UserRepository<S, K>,
        query: String,
    ) -> Self {
        Self {
            query,
            loading: repository.is_loading(),
            error: repository.error(),
            users: repository.users(),
            local_count: repository.local_users().len(),
        }
    }

    fn print(&self) {
        if self.loading {
            output::print_message("Loading users...");
        }
        if let Some(error) = &self.error {
            output::print_error(error);
        }
        render_results(&self.users, self.local_count, &self.query);
    }
}

/// Read queries line by line from stdin and print matches once typing
/// pauses for `delay`. Remote users are fetched while input is read; when
/// the fetch settles, the latest query is shown again with them included.
pub async fn search<S, K>(repository: &UserRepository<S, K>, delay: Duration) -> Result<()>
where
    S: UserSource + Send + Sync + 'static,
    K: KeyValueStore + Send + Sync + 'static,
{
    let stdin = BufReader::new(tokio::io::stdin());
    run_search(repository, stdin, delay, |view| view.print()).await
}

async fn run_search<S, K, R, F>(
    repository: &UserRepository<S, K>,
    input: R,
    delay: Duration,
    mut render: F,
) -> Result<()>
where
    S: UserSource + Send + Sync + 'static,
    K: KeyValueStore + Send + Sync + 'static,
    R: AsyncBufRead + Unpin,
    F: FnMut(SearchView) + Send + 'static,
{
    let snapshot = repository.clone();
    let debouncer = Debouncer::new(delay, move |query: String| {
        render(SearchView::capture(&snapshot, query));
        std::future::ready(())
    });

    let refresh = repository.refresh();
    tokio::pin!(refresh);
    let mut fetched = false;
    let mut last_query: Option<String> = None;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            () = &mut refresh, if !fetched => {
                fetched = true;
                if let Some(query) = &last_query {
                    debouncer.push(query.clone());
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let query = line.trim().to_string();
                    last_query = Some(query.clone());
                    debouncer.push(query);
                }
                Ok(None) => break,
                Err(e) => {
                    repository.shutdown();
                    debouncer.cancel();
                    return Err(e.into());
                }
            },
        }
    }

    // Input ended before the fetch did: wait for it so the last query is
    // answered against the full directory.
    if !fetched {
        refresh.await;
        if let Some(query) = last_query {
            debouncer.push(query);
        }
    }
    debouncer.finish().await;
    repository.shutdown();

    Ok(())
}
