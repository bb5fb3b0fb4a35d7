use anyhow::Result;

mod api;
mod app;
mod auth;
mod config;
mod handler;
mod logging;
mod tui;
mod ui;

use api::ApiClient;
use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::load_or_init().unwrap_or_else(|_| Config::new());
    let server_url = config.resolve_server_url();
    tracing::info!("starting insights client against {server_url}");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(ApiClient::new(&server_url));

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }

        // Apply any finished backend requests before the next draw
        app.poll_pending_tasks().await;
    }
    Ok(())
}
