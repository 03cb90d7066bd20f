//! Headless-browser retrieval for storefronts that render listings in JavaScript.
//!
//! One browser (one tab) is launched on the first rendered fetch and reused
//! until [`Fetcher::close`]. Dropping the session kills the browser process,
//! so it is released on unwinding paths too.

use super::{Fetcher, Page, Strategy};
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Keeps the DevTools connection open between rendered fetches that may be
/// minutes apart while direct fetches run.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct RenderOptions {
    chrome_path: Option<PathBuf>,
    timeout: Duration,
}

/// A live browser and the tab every navigation goes through.
pub struct RenderSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl RenderSession {
    fn launch(options: &RenderOptions) -> anyhow::Result<Self> {
        let launch = LaunchOptions {
            headless: true,
            sandbox: false,
            path: options.chrome_path.clone(),
            idle_browser_timeout: IDLE_BROWSER_TIMEOUT,
            args: vec![OsStr::new("--disable-dev-shm-usage")],
            ..Default::default()
        };

        let browser = Browser::new(launch)?;
        let tab = browser.new_tab()?;
        tab.set_default_timeout(options.timeout);

        Ok(Self { _browser: browser, tab })
    }
}

enum SessionState {
    NotStarted,
    Running(RenderSession),
    /// Launch failed; later fetches fail fast instead of relaunching.
    Unavailable(String),
}

/// Rendered fetcher owning the lazily created [`RenderSession`].
pub struct RenderedFetcher {
    options: RenderOptions,
    state: Mutex<SessionState>,
}

impl RenderedFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            options: RenderOptions {
                chrome_path: config.chrome_path.clone(),
                timeout: Duration::from_secs(config.render_timeout_secs),
            },
            state: Mutex::new(SessionState::NotStarted),
        }
    }

    /// Returns true while a browser is running.
    pub async fn is_active(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Running(_))
    }

    /// Returns the session tab, launching the browser on first use.
    async fn tab(&self, state: &mut SessionState, url: &str) -> Result<Arc<Tab>> {
        match state {
            SessionState::Running(session) => return Ok(session.tab.clone()),
            SessionState::Unavailable(reason) => {
                return Err(ScrapeError::transport(url, format!("browser unavailable: {}", reason)));
            }
            SessionState::NotStarted => {}
        }

        info!("Launching headless browser");
        let options = self.options.clone();
        let launched = tokio::task::spawn_blocking(move || RenderSession::launch(&options))
            .await
            .map_err(|e| ScrapeError::transport(url, e))?;

        match launched {
            Ok(session) => {
                let tab = session.tab.clone();
                *state = SessionState::Running(session);
                Ok(tab)
            }
            Err(e) => {
                warn!("Headless browser failed to launch: {}", e);
                *state = SessionState::Unavailable(e.to_string());
                Err(ScrapeError::transport(url, format!("browser launch failed: {}", e)))
            }
        }
    }
}

#[async_trait]
impl Fetcher for RenderedFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let mut state = self.state.lock().await;
        let tab = self.tab(&mut state, url).await?;

        debug!("RENDER {}", url);

        let target = url.to_string();
        let (html, current) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            tab.navigate_to(&target)?.wait_until_navigated()?;
            Ok((tab.get_content()?, tab.get_url()))
        })
        .await
        .map_err(|e| ScrapeError::transport(url, e))?
        .map_err(|e| ScrapeError::transport(url, e))?;

        let resolved = Url::parse(&current).map_err(|e| ScrapeError::parse(&current, e))?;
        Ok(Page::new(html, resolved))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Rendered
    }

    async fn close(&self) {
        let mut state = self.state.lock().await;
        if let SessionState::Running(session) =
            std::mem::replace(&mut *state, SessionState::NotStarted)
        {
            info!("Shutting down headless browser");
            // Browser::drop blocks while the process exits
            let _ = tokio::task::spawn_blocking(move || drop(session)).await;
        }
    }
}
