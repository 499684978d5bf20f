use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Deserialize};

use crate::error::{Result, Error, ErrorKind};
use crate::location::Location;
use crate::storage::Amount;


/// File with instance configuration.
const CONFIG_FILE: &str = "config";

/// Monthly budget of users, who never set one.
const DEFAULT_BUDGET: Decimal = dec!(1000);

/// Part of the budget, spending which triggers an alert.
const DEFAULT_ALERT_RATIO: Decimal = dec!(0.8);

/// Number of months in spending trend.
const DEFAULT_TREND_MONTHS: usize = 6;


/// Type of local xpns instance identifier.
pub type InstanceId = String;


/// App's instance configuration, contains long-term info.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier of a local xpns instance.
    instance_id: InstanceId,

    /// Monthly budget of users, who never set one.
    default_budget: Amount,

    /// Part of the budget, spending which triggers an alert.
    alert_ratio: Decimal,

    /// Number of months in spending trend.
    trend_months: usize,
}


impl Config {
    /// Opens an existing storage and load stored configuration.
    ///
    /// * `loc` - storage location provider
    pub fn open<L: Location>(loc: &L) -> Result<Self> {
        let raw_config = std::fs::read_to_string(Self::config_file(loc))?;

        let config: Config = serde_json::from_str(&raw_config)?;
        config.validate()
            .map_err(|e| e.into_kind(ErrorKind::Storage))?;

        tracing::debug!(instance = %config.instance_id, "configuration loaded");
        Ok(config)
    }

    /// Creates a new storage and then loads configuration.
    ///
    /// * `loc` - storage location provider
    pub fn create<L: Location>(loc: &L) -> Result<Self> {
        //
        // Check is root location exists and create it if necessary
        //

        loc.create_if_absent()?;

        //
        // Save defaults with a fresh instance identifier,
        // and then just open config :)
        //

        let raw_config = serde_json::to_string_pretty(&Config::default())?;
        std::fs::write(Self::config_file(loc), raw_config)?;

        Self::open(loc)
    }

    /// Opens configuration if it exists, creates it otherwise.
    ///
    /// * `loc` - storage location provider
    pub fn open_or_create<L: Location>(loc: &L) -> Result<Self> {
        if Self::config_file(loc).exists() {
            Self::open(loc)
        } else {
            Self::create(loc)
        }
    }

    /// Changes budget given to users, who never set one.
    pub fn with_default_budget(mut self, budget: Amount) -> Self {
        self.default_budget = budget;
        self
    }

    /// Changes budget part, spending which triggers an alert.
    ///
    /// * `ratio` - value between 0 and 1
    pub fn with_alert_ratio(mut self, ratio: Decimal) -> Result<Self> {
        self.alert_ratio = ratio;
        self.validate()
            .and(Ok(self))
    }

    /// Obtain the stored instance identifier.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// Budget of users, who never set one.
    pub fn default_budget(&self) -> Amount {
        self.default_budget
    }

    /// Part of the budget, spending which triggers an alert.
    pub fn alert_ratio(&self) -> Decimal {
        self.alert_ratio
    }

    /// Number of months in spending trend.
    pub fn trend_months(&self) -> usize {
        self.trend_months
    }
}


impl Default for Config {
    fn default() -> Self {
        Config {
            instance_id: Self::new_instance(),
            default_budget: Amount::new(DEFAULT_BUDGET).unwrap_or_default(),
            alert_ratio: DEFAULT_ALERT_RATIO,
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}


impl Config {
    fn config_file<L: Location>(loc: &L) -> std::path::PathBuf {
        loc.file(CONFIG_FILE)
    }

    fn validate(&self) -> Result<()> {
        if self.alert_ratio < Decimal::ZERO || self.alert_ratio > Decimal::ONE {
            return Err(Error::from_message("Alert ratio must be between 0 and 1")
                .with_extra(self.alert_ratio.to_string()));
        }

        if self.trend_months == 0 {
            return Err(Error::from_message("Trend must cover at least one month"));
        }

        Ok(())
    }

    fn new_instance() -> InstanceId {
        let mut buffer = uuid::Uuid::encode_buffer();
        uuid::Uuid::new_v4()
            .hyphenated()
            .encode_lower(&mut buffer)
            .to_owned()
    }
}
