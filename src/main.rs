use cardash::{App, AppEvent, Args, ConfigManager, LoadOptions, Theme, APP_NAME};
use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args) -> Result<()> {
    let config = match ConfigManager::new(APP_NAME).and_then(|m| m.load_config()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config: {e}. Using defaults.");
            cardash::AppConfig::default()
        }
    };
    let theme = Theme::from_config(&config.theme)?;
    let poll_interval = std::time::Duration::from_millis(config.display.event_poll_interval_ms);

    let (tx, rx) = std::sync::mpsc::channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config);
    if args.debug {
        app.enable_debug();
    }
    let opts: LoadOptions = args.into();
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Load(args.raw.clone(), args.cleaned.clone(), opts))?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
