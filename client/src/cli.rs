//! Command-line front end.
//!
//! Every subcommand except `login` and `health` first resolves its route
//! through the router, then drives the matching view and renders it as plain
//! text. The binary prints that text on stdout, followed by the flash message
//! the view left behind.

use crate::app::AppContext;
use crate::models::{
    CreatedBy, NewUser, Priority, Role, Ticket, TicketFilter, TicketStatus, Visibility,
};
use crate::ui::router::{LOGIN_PATH, Navigation, View};
use crate::ui::sort::{SortDirection, SortKey, SortState};
use crate::utils::format::{format_date, format_timestamp, format_user_brief, format_user_id};
use crate::views::{
    CommentsSection, LoadState, LoginView, TicketDetailView, TicketFormView, TicketListView,
    UserPanelView,
};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fmt::Write;

const LOGIN_HINT: &str = "Not logged in. Run `helpdesk login <username> --password <password>` first.";

#[derive(Parser, Debug)]
#[command(name = "helpdesk")]
#[command(about = "Help-desk ticketing client")]
#[command(
    after_help = "Environment:\n  HELPDESK_API_BASE_URL             Server origin (default http://127.0.0.1:8000)\n  HELPDESK_SESSION_FILE             Persisted session (default ~/.helpdesk/session.json)\n  HELPDESK_REQUEST_TIMEOUT_SECONDS  Per-request timeout\n  HELPDESK_FLASH_TIMEOUT_MS         Flash message lifetime"
)]
pub struct Cli {
    /// -v for info logs, -vv for debug logs (stderr)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with a username or email
    Login {
        identifier: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the persisted session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Resolve a path like `/tickets/42` and render the view it lands on
    Open { path: String },
    /// List tickets
    Tickets(TicketsArgs),
    /// Show one ticket with its comments
    Show { id: u64 },
    /// Open a new ticket
    Create(CreateArgs),
    /// Change the status and/or assignee of a ticket
    Update {
        id: u64,
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long, conflicts_with = "unassign")]
        assign: Option<u64>,
        #[arg(long, default_value_t = false)]
        unassign: bool,
    },
    /// Delete a ticket (admins)
    Delete { id: u64 },
    /// Comment on a ticket
    Comment {
        id: u64,
        message: String,
        /// Visible to technicians and admins only
        #[arg(long, default_value_t = false)]
        internal: bool,
    },
    /// Delete a comment (admins)
    DeleteComment {
        id: u64,
        /// Ticket the comment belongs to
        #[arg(long)]
        ticket: u64,
    },
    /// Ticket counters (technicians and admins)
    Stats,
    /// Account summary, plus the user table for admins
    Users,
    /// Create a user (admins)
    UserAdd(UserAddArgs),
    /// Change a user's role or active flag (admins)
    UserSet {
        id: u64,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, default_value_t = false, conflicts_with = "deactivate")]
        activate: bool,
        #[arg(long, default_value_t = false)]
        deactivate: bool,
    },
    /// Delete a user (admins)
    UserDelete { id: u64 },
    /// Check that the API is up
    Health,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketsArgs {
    #[arg(long)]
    pub status: Option<TicketStatus>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub category: Option<u64>,
    #[arg(long)]
    pub assigned_to: Option<u64>,
    /// Only tickets I created
    #[arg(long, default_value_t = false)]
    pub mine: bool,
    /// Server-side title/description filter
    #[arg(long)]
    pub query: Option<String>,
    /// Narrow the loaded rows by title or description
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub sort: Option<SortKey>,
    #[arg(long, default_value_t = false, requires = "sort")]
    pub desc: bool,
}

impl TicketsArgs {
    fn filter(&self) -> TicketFilter {
        TicketFilter {
            status: self.status,
            priority: self.priority,
            category: self.category,
            assigned_to: self.assigned_to,
            created_by: self.mine.then_some(CreatedBy::Me),
            search: self.query.clone(),
        }
    }

    fn sort_state(&self) -> SortState {
        match self.sort {
            Some(key) if self.desc => SortState::new(key, SortDirection::Descending),
            Some(key) => SortState::new(key, SortDirection::Ascending),
            None => SortState::default(),
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "MEDIUM")]
    pub priority: Priority,
    #[arg(long)]
    pub category: Option<u64>,
    /// YYYY-MM-DD, today or later
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UserAddArgs {
    pub username: String,
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long, default_value = "USER")]
    pub role: Role,
    #[arg(long, default_value_t = false)]
    pub inactive: bool,
}

/// Runs one command, appending what the screen would show to `out`.
pub async fn run(ctx: &AppContext, command: Command, out: &mut String) -> Result<()> {
    match command {
        Command::Login {
            identifier,
            password,
        } => login(ctx, identifier, password, out).await,
        Command::Logout => {
            ctx.session_store.logout().await;
            ctx.flash.info("Logged out");
            Ok(())
        }
        Command::Health => {
            let health = ctx.health.check().await?;
            writeln!(out, "{}: {}", ctx.config.api_root(), health.status)?;
            Ok(())
        }
        Command::Whoami => {
            enter(ctx, &View::UserPanel.path())?;
            render_account(ctx, out)
        }
        Command::Open { path } => open(ctx, &path, out).await,
        Command::Tickets(args) => list_tickets(ctx, &args, out).await,
        Command::Show { id } => show_ticket(ctx, id, out).await,
        Command::Create(args) => create_ticket(ctx, args, out).await,
        Command::Update {
            id,
            status,
            assign,
            unassign,
        } => {
            let assignee = if unassign { Some(None) } else { assign.map(Some) };
            update_ticket(ctx, id, status, assignee, out).await
        }
        Command::Delete { id } => delete_ticket(ctx, id, out).await,
        Command::Comment {
            id,
            message,
            internal,
        } => add_comment(ctx, id, message, internal, out).await,
        Command::DeleteComment { id, ticket } => delete_comment(ctx, ticket, id, out).await,
        Command::Stats => show_stats(ctx, out).await,
        Command::Users => show_users(ctx, out).await,
        Command::UserAdd(args) => add_user(ctx, args, out).await,
        Command::UserSet {
            id,
            role,
            activate,
            deactivate,
        } => {
            let active = match (activate, deactivate) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            set_user(ctx, id, role, active, out).await
        }
        Command::UserDelete { id } => delete_user(ctx, id, out).await,
    }
}

/// Resolves `path` through the router; anything but a render is an error.
fn enter(ctx: &AppContext, path: &str) -> Result<View> {
    match ctx.navigate(path) {
        Navigation::Render(view) => Ok(view),
        Navigation::Redirect(target) if target == LOGIN_PATH => bail!(LOGIN_HINT),
        Navigation::Redirect(target) => bail!("{path} redirects to {target}"),
        Navigation::Pending => bail!("The session is still being restored"),
    }
}

fn require(allowed: bool, message: &str) -> Result<()> {
    if allowed { Ok(()) } else { bail!("{message}") }
}

fn loaded(state: LoadState, error: Option<&String>) -> Result<()> {
    if state == LoadState::Failed {
        bail!(
            "{}",
            error.map(String::as_str).unwrap_or("The request failed")
        );
    }
    Ok(())
}

async fn open(ctx: &AppContext, path: &str, out: &mut String) -> Result<()> {
    let view = match ctx.navigate(path) {
        Navigation::Render(view) => view,
        Navigation::Redirect(target) if target == LOGIN_PATH => bail!(LOGIN_HINT),
        Navigation::Redirect(target) => {
            writeln!(out, "Redirected to {target}")?;
            enter(ctx, &target)?
        }
        Navigation::Pending => bail!("The session is still being restored"),
    };

    match view {
        View::Login => writeln!(
            out,
            "Log in with `helpdesk login <username> --password <password>`"
        )?,
        View::TicketList => list_tickets(ctx, &TicketsArgs::default(), out).await?,
        View::TicketCreate => writeln!(
            out,
            "Open a ticket with `helpdesk create --title <title> --description <text>`"
        )?,
        View::TicketDetail(id) => show_ticket(ctx, id, out).await?,
        View::UserPanel => show_users(ctx, out).await?,
    }
    Ok(())
}

async fn login(ctx: &AppContext, identifier: String, password: String, out: &mut String) -> Result<()> {
    let mut view = LoginView::new(ctx);
    view.identifier = identifier;
    view.password = password;
    match view.submit().await {
        Some(_) => render_account(ctx, out),
        None => bail!(
            "{}",
            view.error.unwrap_or_else(|| "Login failed".to_string())
        ),
    }
}

fn render_account(ctx: &AppContext, out: &mut String) -> Result<()> {
    let user = ctx.session.user().ok_or_else(|| anyhow!(LOGIN_HINT))?;
    let role = ctx
        .session
        .role()
        .map(|role| role.as_str())
        .unwrap_or("-");
    writeln!(out, "#{} {} <{}> {}", user.id, user.username, user.email, role)?;
    Ok(())
}

async fn list_tickets(ctx: &AppContext, args: &TicketsArgs, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketList.path())?;
    let mut view = TicketListView::new(ctx);
    view.filter = args.filter();
    view.sort = args.sort_state();
    view.search = args.search.clone().unwrap_or_default();
    view.load().await;
    loaded(view.state, view.error.as_ref())?;
    render_ticket_table(&view, out)
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn assignee(ticket: &Ticket) -> String {
    match &ticket.assigned_to_user {
        Some(user) => format_user_brief(Some(user)),
        None => format_user_id(ticket.assigned_to, &[]),
    }
}

fn render_ticket_table(view: &TicketListView, out: &mut String) -> Result<()> {
    let rows = view.rows();
    writeln!(
        out,
        "{:>5}  {:<32}  {:<11}  {:<8}  {:<14}  {:<24}  {:<16}  {:<10}",
        "ID", "TITLE", "STATUS", "PRIORITY", "CATEGORY", "ASSIGNED", "CREATED", "DUE"
    )?;
    for ticket in &rows {
        writeln!(
            out,
            "{:>5}  {:<32}  {:<11}  {:<8}  {:<14}  {:<24}  {:<16}  {:<10}",
            ticket.id,
            clip(&ticket.title, 32),
            ticket.status.label(),
            ticket.priority.label(),
            clip(&view.category_name(ticket.category), 14),
            clip(&assignee(ticket), 24),
            format_timestamp(ticket.created_at.as_ref()),
            format_date(ticket.due_date.as_ref()),
        )?;
    }
    match view.sort.active() {
        Some((key, direction)) => {
            let direction = match direction {
                SortDirection::Ascending => "ascending",
                SortDirection::Descending => "descending",
            };
            writeln!(out, "{} ticket(s), sorted by {key} {direction}", rows.len())?;
        }
        None => writeln!(out, "{} ticket(s)", rows.len())?,
    }
    Ok(())
}

async fn show_ticket(ctx: &AppContext, id: u64, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketDetail(id).path())?;
    let mut view = TicketDetailView::new(ctx, id);
    view.load().await;
    loaded(view.state, view.error.as_ref())?;
    render_ticket(&view, out)
}

fn render_ticket(view: &TicketDetailView, out: &mut String) -> Result<()> {
    let ticket = view
        .ticket()
        .ok_or_else(|| anyhow!("Ticket #{} is not loaded", view.id))?;
    let author = match &ticket.created_by_user {
        Some(user) => format_user_brief(Some(user)),
        None => format_user_id(ticket.created_by, &view.technicians),
    };

    writeln!(out, "#{} {}", ticket.id, ticket.title)?;
    writeln!(out, "Status:      {}", ticket.status.label())?;
    writeln!(out, "Priority:    {}", ticket.priority.label())?;
    writeln!(
        out,
        "Category:    {}",
        ticket
            .category
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "Assigned to: {}", view.assignee_label())?;
    writeln!(out, "Created by:  {author}")?;
    writeln!(out, "Created:     {}", format_timestamp(ticket.created_at.as_ref()))?;
    writeln!(out, "Updated:     {}", format_timestamp(ticket.updated_at.as_ref()))?;
    writeln!(out, "Due:         {}", format_date(ticket.due_date.as_ref()))?;
    if !ticket.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", ticket.description)?;
    }

    writeln!(out)?;
    let comments = &view.comments;
    if let Some(error) = &comments.error {
        writeln!(out, "Comments: {error}")?;
        return Ok(());
    }
    writeln!(out, "Comments ({}):", comments.comments.len())?;
    for comment in &comments.comments {
        let marker = match comment.visibility {
            Visibility::Internal => " [internal]",
            Visibility::Public => "",
        };
        writeln!(
            out,
            "  #{} {} {}{}: {}",
            comment.id,
            format_timestamp(comment.created_at.as_ref()),
            format_user_id(Some(comment.author), &view.technicians),
            marker,
            comment.message
        )?;
    }
    Ok(())
}

async fn create_ticket(ctx: &AppContext, args: CreateArgs, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketCreate.path())?;
    let mut form = TicketFormView::new(ctx);
    form.load_categories().await;
    if let Some(category) = args.category {
        if !form.categories.is_empty() && !form.categories.contains_key(&category) {
            bail!("Unknown category #{category}");
        }
    }
    form.title = args.title;
    form.description = args.description;
    form.priority = args.priority;
    form.category = args.category;
    form.due_date = args.due;

    match form.submit().await {
        Some(target) => {
            writeln!(out, "Open it with `helpdesk open {target}`")?;
            Ok(())
        }
        None => bail!(
            "{}",
            form.error
                .unwrap_or_else(|| "Failed to create ticket".to_string())
        ),
    }
}

async fn update_ticket(
    ctx: &AppContext,
    id: u64,
    status: Option<TicketStatus>,
    assignee: Option<Option<u64>>,
    out: &mut String,
) -> Result<()> {
    enter(ctx, &View::TicketDetail(id).path())?;
    let mut view = TicketDetailView::new(ctx, id);
    view.load().await;
    loaded(view.state, view.error.as_ref())?;

    let capabilities = ctx.capabilities();
    let ticket = view
        .ticket()
        .cloned()
        .ok_or_else(|| anyhow!("Ticket #{id} is not loaded"))?;
    if let Some(status) = status {
        require(
            capabilities.can_change_status(&ticket),
            "You cannot change the status of this ticket",
        )?;
        view.set_status(status);
    }
    if let Some(assignee) = assignee {
        require(
            capabilities.can_assign(&ticket, assignee),
            "You cannot make this assignment",
        )?;
        view.set_assignee(assignee);
    }

    if !view.can_save() {
        writeln!(out, "Nothing to change")?;
        return Ok(());
    }
    view.save().await;
    if let Some(error) = &view.error {
        bail!("{error}");
    }
    render_ticket(&view, out)
}

async fn delete_ticket(ctx: &AppContext, id: u64, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketDetail(id).path())?;
    let mut view = TicketDetailView::new(ctx, id);
    match view.delete().await {
        Some(_) => {
            writeln!(out, "Ticket #{id} deleted")?;
            Ok(())
        }
        None => bail!(
            "{}",
            view.error
                .unwrap_or_else(|| "Failed to delete ticket".to_string())
        ),
    }
}

async fn add_comment(
    ctx: &AppContext,
    ticket_id: u64,
    message: String,
    internal: bool,
    out: &mut String,
) -> Result<()> {
    enter(ctx, &View::TicketDetail(ticket_id).path())?;
    let mut section = CommentsSection::new(ctx, ticket_id);
    if internal {
        require(
            section.can_choose_visibility(),
            "Only technicians and admins can post internal comments",
        )?;
        section.visibility = Visibility::Internal;
    }
    section.message = message;
    section.add().await;

    if let Some(error) = section.form_error.as_ref().or(section.error.as_ref()) {
        bail!("{error}");
    }
    if let Some(comment) = section.comments.first() {
        writeln!(
            out,
            "Comment #{} added to ticket #{ticket_id} ({})",
            comment.id, comment.visibility
        )?;
    }
    Ok(())
}

async fn delete_comment(ctx: &AppContext, ticket_id: u64, id: u64, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketDetail(ticket_id).path())?;
    let mut section = CommentsSection::new(ctx, ticket_id);
    require(section.can_delete(), "Only admins can delete comments")?;
    section.delete(id).await;
    if let Some(error) = &section.error {
        bail!("{error}");
    }
    writeln!(out, "Comment #{id} deleted")?;
    Ok(())
}

async fn show_stats(ctx: &AppContext, out: &mut String) -> Result<()> {
    enter(ctx, &View::TicketList.path())?;
    require(
        ctx.capabilities().can_view_stats(),
        "Ticket stats are only available to technicians and admins",
    )?;
    let stats = ctx.tickets.stats().await?;

    writeln!(out, "Total:        {}", stats.total)?;
    writeln!(out, "Open:         {}", stats.counters.open)?;
    writeln!(out, "In progress:  {}", stats.counters.in_progress)?;
    writeln!(out, "Resolved:     {}", stats.counters.resolved)?;
    writeln!(out, "Closed:       {}", stats.counters.closed)?;
    writeln!(out, "Overdue:      {}", stats.counters.overdue)?;
    if !stats.by_priority.is_empty() {
        writeln!(out, "By priority:")?;
        for entry in &stats.by_priority {
            writeln!(out, "  {:<12}{}", entry.priority.label(), entry.count)?;
        }
    }
    Ok(())
}

async fn admin_panel(ctx: &AppContext) -> Result<UserPanelView> {
    enter(ctx, &View::UserPanel.path())?;
    let mut panel = UserPanelView::new(ctx);
    require(panel.is_admin(), "Only admins can manage users")?;
    panel.load().await;
    loaded(panel.state, panel.error.as_ref())?;
    Ok(panel)
}

fn render_users(panel: &UserPanelView, out: &mut String) -> Result<()> {
    writeln!(
        out,
        "{:>5}  {:<20}  {:<32}  {:<10}  {:<6}",
        "ID", "USERNAME", "EMAIL", "ROLE", "ACTIVE"
    )?;
    for row in &panel.rows {
        writeln!(
            out,
            "{:>5}  {:<20}  {:<32}  {:<10}  {:<6}",
            row.user.id,
            clip(&row.user.username, 20),
            clip(&row.user.email, 32),
            row.role().as_str(),
            if row.user.is_active { "yes" } else { "no" }
        )?;
    }
    Ok(())
}

async fn show_users(ctx: &AppContext, out: &mut String) -> Result<()> {
    enter(ctx, &View::UserPanel.path())?;
    render_account(ctx, out)?;
    if !ctx.capabilities().can_manage_users() {
        return Ok(());
    }
    let panel = admin_panel(ctx).await?;
    writeln!(out)?;
    render_users(&panel, out)
}

async fn add_user(ctx: &AppContext, args: UserAddArgs, out: &mut String) -> Result<()> {
    let mut panel = admin_panel(ctx).await?;
    let created = panel
        .create(NewUser {
            username: args.username,
            email: args.email,
            password: args.password,
            role: args.role,
            is_active: !args.inactive,
        })
        .await;
    if !created {
        bail!(
            "{}",
            panel
                .create_error
                .unwrap_or_else(|| "Failed to create user".to_string())
        );
    }
    render_users(&panel, out)
}

async fn set_user(
    ctx: &AppContext,
    id: u64,
    role: Option<Role>,
    active: Option<bool>,
    out: &mut String,
) -> Result<()> {
    let mut panel = admin_panel(ctx).await?;
    if !panel.rows.iter().any(|row| row.user.id == id) {
        bail!("User #{id} not found");
    }
    if let Some(role) = role {
        panel.set_role(id, role);
    }
    if let Some(active) = active {
        panel.set_active(id, active);
    }
    if !panel.can_save(id) {
        writeln!(out, "Nothing to change")?;
        return Ok(());
    }
    panel.save(id).await;
    if let Some(error) = &panel.error {
        bail!("{error}");
    }
    render_users(&panel, out)
}

async fn delete_user(ctx: &AppContext, id: u64, out: &mut String) -> Result<()> {
    let mut panel = admin_panel(ctx).await?;
    if !panel.rows.iter().any(|row| row.user.id == id) {
        bail!("User #{id} not found");
    }
    panel.delete(id).await;
    if let Some(error) = &panel.error {
        bail!("{error}");
    }
    writeln!(out, "User #{id} deleted")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::test_support::MockBackend;
    use clap::CommandFactory;
    use serde_json::json;
    use std::sync::Arc;

    async fn ctx_as(backend: &MockBackend, role: Option<&str>) -> AppContext {
        let ctx = AppContext::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap();
        ctx.start().await;
        if let Some(role) = role {
            let user = serde_json::from_value(
                json!({"id": 1, "username": "alice", "email": "alice@example.com", "role": role}),
            )
            .unwrap();
            ctx.session.establish("t1".to_string(), user).await;
        }
        ctx
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::try_parse_from(["helpdesk", "update", "7", "--status", "in-progress", "--unassign"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Update {
                id: 7,
                status: Some(TicketStatus::InProgress),
                assign: None,
                unassign: true,
            }
        );

        assert!(
            Cli::try_parse_from(["helpdesk", "update", "7", "--assign", "3", "--unassign"]).is_err()
        );
        assert!(Cli::try_parse_from(["helpdesk", "tickets", "--desc"]).is_err());
    }

    #[test]
    fn test_tickets_args_build_filter_and_sort() {
        let cli = Cli::try_parse_from([
            "helpdesk", "tickets", "--status", "open", "--mine", "--sort", "priority", "--desc",
        ])
        .unwrap();
        let Command::Tickets(args) = cli.command else {
            panic!("expected tickets command");
        };
        let filter = args.filter();
        assert_eq!(filter.status, Some(TicketStatus::Open));
        assert_eq!(filter.created_by, Some(CreatedBy::Me));
        assert_eq!(
            args.sort_state().active(),
            Some((SortKey::Priority, SortDirection::Descending))
        );
    }

    #[test]
    fn test_clip_marks_truncation() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 5), "abcd…");
    }

    #[tokio::test]
    async fn test_protected_command_without_session_points_to_login() {
        let backend = MockBackend::start().await;
        let ctx = ctx_as(&backend, None).await;
        let mut out = String::new();

        let error = run(&ctx, Command::Tickets(TicketsArgs::default()), &mut out)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), LOGIN_HINT);
        assert!(backend.requests_to("GET", "/api/tickets/").is_empty());

        let error = run(&ctx, Command::Open { path: "/user".to_string() }, &mut out)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), LOGIN_HINT);
    }

    #[tokio::test]
    async fn test_open_unknown_path_lands_on_ticket_list() {
        let backend = MockBackend::start().await;
        backend.respond(
            "GET",
            "/api/tickets/",
            200,
            json!([
                {"id": 1, "title": "VPN drops", "status": "OPEN", "priority": "LOW"},
                {"id": 2, "title": "Printer jammed", "status": "IN_PROGRESS", "priority": "HIGH",
                 "assigned_to_user": {"id": 4, "username": "tom", "email": ""}}
            ]),
        );
        backend.respond("GET", "/api/categories/", 200, json!([]));
        let ctx = ctx_as(&backend, Some("USER")).await;
        let mut out = String::new();

        run(&ctx, Command::Open { path: "/nowhere".to_string() }, &mut out)
            .await
            .unwrap();
        assert!(out.starts_with("Redirected to /tickets\n"));
        assert!(out.contains("Printer jammed"));
        assert!(out.contains("tom"));
        assert!(out.ends_with("2 ticket(s)\n"));
    }

    #[tokio::test]
    async fn test_update_saves_status_then_assignee() {
        let backend = MockBackend::start().await;
        let ticket = json!({"id": 7, "title": "VPN drops", "status": "OPEN", "assigned_to": null});
        backend.respond("GET", "/api/tickets/7/", 200, ticket);
        backend.respond("GET", "/api/users/technicians/", 200, json!([]));
        backend.respond("GET", "/api/tickets/7/comments/", 200, json!([]));
        backend.respond(
            "PATCH",
            "/api/tickets/7/status/",
            200,
            json!({"id": 7, "title": "VPN drops", "status": "IN_PROGRESS", "assigned_to": null}),
        );
        backend.respond(
            "PATCH",
            "/api/tickets/7/assign/",
            200,
            json!({"id": 7, "title": "VPN drops", "status": "IN_PROGRESS", "assigned_to": 4}),
        );
        let ctx = ctx_as(&backend, Some("ADMIN")).await;
        let mut out = String::new();

        run(
            &ctx,
            Command::Update {
                id: 7,
                status: Some(TicketStatus::InProgress),
                assign: Some(4),
                unassign: false,
            },
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            backend.requests_to("PATCH", "/api/tickets/7/status/")[0].body,
            json!({"status": "IN_PROGRESS"})
        );
        assert_eq!(
            backend.requests_to("PATCH", "/api/tickets/7/assign/")[0].body,
            json!({"assigned_to": 4})
        );
        assert!(out.contains("Status:      In progress"));
        assert!(out.contains("Assigned to: User #4"));
        assert_eq!(ctx.flash.current().unwrap().text, "Ticket updated");
    }

    #[tokio::test]
    async fn test_stats_refused_for_plain_users() {
        let backend = MockBackend::start().await;
        let ctx = ctx_as(&backend, Some("USER")).await;
        let mut out = String::new();

        let error = run(&ctx, Command::Stats, &mut out).await.unwrap_err();
        assert!(error.to_string().contains("technicians and admins"));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_users_shows_account_only_for_non_admins() {
        let backend = MockBackend::start().await;
        let ctx = ctx_as(&backend, Some("TECHNICIAN")).await;
        let mut out = String::new();

        run(&ctx, Command::Users, &mut out).await.unwrap();
        assert_eq!(out, "#1 alice <alice@example.com> TECHNICIAN\n");
        assert_eq!(backend.request_count(), 0);
    }
}
