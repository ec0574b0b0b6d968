use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use pagescript_core_types::TabId;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tool_contract::{PagePort, Tab, ToolContext};
use tracing::{debug, info, warn};

use crate::config::{CdpConfig, MAX_EVAL_TIMEOUT_MS};
use crate::error::{AdapterError, AdapterErrorKind};
use crate::page::CdpPage;

const ATTACH_WAIT: Duration = Duration::from_secs(3);
const ATTACH_POLL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct TabState {
    tabs: Vec<Tab>,
    current: Option<usize>,
}

/// Browser session exposing its page targets as tabs.
pub struct CdpContext {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    owns_browser: bool,
    state: RwLock<TabState>,
    eval_timeout: Duration,
}

impl CdpContext {
    /// Attaches to `websocket_url` when set, otherwise launches a browser.
    /// Selects the first open page, creating `about:blank` only when the
    /// browser has no page targets at all.
    pub async fn connect(config: CdpConfig) -> Result<Self, AdapterError> {
        let (browser, mut handler) = match config.websocket_url.as_deref() {
            Some(url) => {
                info!(%url, "attaching to running browser");
                Browser::connect(url).await.map_err(|err| {
                    AdapterError::new(AdapterErrorKind::Connect).with_hint(format!("{url}: {err}"))
                })?
            }
            None => {
                let browser_config = launch_config(&config)?;
                info!(headless = config.headless, "launching browser");
                Browser::launch(browser_config).await.map_err(|err| {
                    AdapterError::new(AdapterErrorKind::Launch).with_hint(err.to_string())
                })?
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "cdp handler stopped");
                    break;
                }
            }
        });

        if config.eval_timeout_ms > MAX_EVAL_TIMEOUT_MS {
            warn!(
                requested_ms = config.eval_timeout_ms,
                max_ms = MAX_EVAL_TIMEOUT_MS,
                "eval timeout clamped to cdp command limit"
            );
        }

        let context = Self {
            browser: Mutex::new(browser),
            handler,
            owns_browser: config.websocket_url.is_none(),
            state: RwLock::new(TabState::default()),
            eval_timeout: config.eval_timeout(),
        };
        if !context.owns_browser {
            context.attach_existing_pages().await?;
        }
        context.refresh_tabs().await?;
        Ok(context)
    }

    /// Re-reads the browser's page targets. Keeps the current selection when
    /// still in range.
    pub async fn refresh_tabs(&self) -> Result<usize, AdapterError> {
        let browser = self.browser.lock().await;
        let mut pages = browser.pages().await.map_err(cdp_io)?;
        if pages.is_empty() {
            debug!("no open pages; creating about:blank");
            pages.push(browser.new_page("about:blank").await.map_err(cdp_io)?);
        }
        drop(browser);

        let tabs: Vec<Tab> = pages.into_iter().map(|page| self.wrap(page)).collect();
        let count = tabs.len();
        let mut state = self.state.write();
        state.current = match state.current {
            Some(index) if index < count => Some(index),
            _ => Some(0),
        };
        state.tabs = tabs;
        Ok(count)
    }

    /// An attached browser's existing targets are not tracked until fetched.
    /// Waits briefly for the discovered page targets to get sessions.
    async fn attach_existing_pages(&self) -> Result<(), AdapterError> {
        let mut browser = self.browser.lock().await;
        let targets = browser.fetch_targets().await.map_err(cdp_io)?;
        let expected = targets.iter().filter(|info| info.r#type == "page").count();
        debug!(expected, "discovered page targets");
        if expected == 0 {
            return Ok(());
        }

        let deadline = Instant::now() + ATTACH_WAIT;
        loop {
            let attached = browser.pages().await.map_err(cdp_io)?.len();
            if attached >= expected {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(attached, expected, "not every page target attached in time");
                return Ok(());
            }
            tokio::time::sleep(ATTACH_POLL).await;
        }
    }

    /// DevTools websocket address of the browser.
    pub async fn websocket_address(&self) -> String {
        self.browser.lock().await.websocket_address().clone()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.read().tabs.clone()
    }

    pub fn select_tab(&self, index: usize) -> Result<Tab, AdapterError> {
        let mut state = self.state.write();
        let tab = state.tabs.get(index).cloned().ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::TabNotFound)
                .with_hint(format!("{index} of {}", state.tabs.len()))
        })?;
        state.current = Some(index);
        Ok(tab)
    }

    /// Opens `url` in a new tab and makes it current.
    pub async fn new_tab(&self, url: &str) -> Result<Tab, AdapterError> {
        let page = {
            let browser = self.browser.lock().await;
            browser.new_page(url).await.map_err(cdp_io)?
        };
        let tab = self.wrap(page);
        let mut state = self.state.write();
        state.tabs.push(tab.clone());
        let last = state.tabs.len() - 1;
        state.current = Some(last);
        Ok(tab)
    }

    /// Closes a launched browser; an attached one is only detached from.
    pub async fn shutdown(self) {
        if self.owns_browser {
            let mut browser = self.browser.lock().await;
            if let Err(err) = browser.close().await {
                warn!(error = %err, "browser close failed");
            }
        }
        self.handler.abort();
    }

    fn wrap(&self, page: Page) -> Tab {
        let page: Arc<dyn PagePort> = Arc::new(CdpPage::new(page, self.eval_timeout));
        Tab::new(TabId::new(), page)
    }
}

impl ToolContext for CdpContext {
    fn current_tab(&self) -> Option<Tab> {
        let state = self.state.read();
        state.current.and_then(|index| state.tabs.get(index).cloned())
    }
}

fn launch_config(config: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
    let executable = config
        .resolve_executable()
        .ok_or_else(|| AdapterError::new(AdapterErrorKind::ExecutableNotFound))?;
    let mut builder = BrowserConfig::builder().chrome_executable(executable);
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(dir) = &config.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    builder
        .build()
        .map_err(|err| AdapterError::new(AdapterErrorKind::Launch).with_hint(err))
}

fn cdp_io(err: chromiumoxide::error::CdpError) -> AdapterError {
    AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
}
