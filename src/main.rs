#![allow(dead_code)]

use cosmic::app::Settings;
use cosmic::cosmic_config::CosmicConfigEntry;
use cosmic::iced::Limits;

mod application;
mod components;
mod localize;
mod message;
mod pages;

use tandem::config;
use tandem::core;
use tandem::store;

use application::{Flags, Tandem};
use config::{CONFIG_VERSION, TandemConfig};
use tandem::core::collection::deep_link_target;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cosmic_cfg = cosmic::cosmic_config::Config::new("dev.tandem.app", CONFIG_VERSION)
        .expect("Failed to create cosmic config");
    let config = TandemConfig::get_entry(&cosmic_cfg).unwrap_or_else(|(_, cfg)| cfg);

    // Set up logging to the systemd user journal (`journalctl --user -t tandem -f`).
    // Wrapper filters: tandem crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("tandem") || target.starts_with("application") || target.starts_with("pages") || target.starts_with("components") {
                    let max = if tandem::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        let journal = systemd_journal_logger::JournalLog::new()
            .unwrap()
            .with_syslog_identifier("tandem".to_string());

        tandem::set_debug_logging(config.debug_logging);

        log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).unwrap();
        // Global max must be Debug so tandem debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }

    localize::localize();

    // A share link (or bare list id) on the command line opens that list
    // directly: `tandem --open https://lists.example.com/#<id>`.
    let launch_target = {
        let args: Vec<String> = std::env::args().collect();
        args.iter()
            .position(|a| a == "--open")
            .and_then(|i| args.get(i + 1))
            .map(|arg| deep_link_target(arg).to_string())
    };

    let mut settings = Settings::default();
    settings = settings.size_limits(Limits::NONE.min_width(360.0).min_height(300.0));

    let flags = Flags { config, cosmic_config: cosmic_cfg, launch_target };
    cosmic::app::run::<Tandem>(settings, flags)?;

    Ok(())
}
