use thiserror::Error;

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions and external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup / row state
    NotFound,
    Expired,

    // Static configuration
    InvalidConfiguration,
    NotConfigured,
    UnknownColumn,

    // Data
    Conversion,

    // Lifecycle
    Initialization,

    // Integration/IO
    Schema,
    Persistence,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Expired => "ERR_EXPIRED",
            ExErrorKind::InvalidConfiguration => "ERR_INVALID_CONFIGURATION",
            ExErrorKind::NotConfigured => "ERR_NOT_CONFIGURED",
            ExErrorKind::UnknownColumn => "ERR_UNKNOWN_COLUMN",
            ExErrorKind::Conversion => "ERR_CONVERSION",
            ExErrorKind::Initialization => "ERR_INITIALIZATION",
            ExErrorKind::Schema => "ERR_SCHEMA",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus context for
/// debugging. Built from [`GatewayError`] at logging and reporting edges.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Initialization phase in which a gateway failed to come up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Creation,
    Seeding,
}

impl InitPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitPhase::Creation => "creation",
            InitPhase::Seeding => "seeding",
        }
    }
}

impl std::fmt::Display for InitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy for table gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Table creation or seeding failed while constructing a gateway
    #[error("Initialization of table \"{table}\" failed during {phase}: {source}")]
    TableInitialization {
        table: String,
        phase: InitPhase,
        #[source]
        source: Box<GatewayError>,
    },

    /// No row exists with the requested identity
    #[error("Table \"{table}\" doesn't have a row with ID #{id}")]
    RowNotFound { table: String, id: i64 },

    /// Row has no live identity (deleted, or never persisted)
    #[error("This row has expired")]
    ExpiredRow,

    /// Malformed static configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// No default gateway context registered under the given name
    #[error("No gateway context registered as \"{name}\"; register one with context::set_named()")]
    NotConfigured { name: String },

    /// Column is not declared by the table schema
    #[error("Table \"{table}\" has no column \"{column}\"")]
    UnknownColumn { table: String, column: String },

    /// Stored value cannot be converted to the declared column type
    #[error("Cannot convert value of column \"{column}\" to {column_type}: {reason}")]
    ValueConversion {
        column: String,
        column_type: String,
        reason: String,
    },

    /// Schema collaborator failure
    #[error("Schema error on table \"{table}\": {message}")]
    Schema { table: String, message: String },

    /// Query or transaction collaborator failure
    #[error("Persistence error in {op}: {message}")]
    Persistence { op: String, message: String },

    #[error("Concurrency error: {message}")]
    Concurrency { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Wrap a failure raised while bringing a table up
    pub fn initialization(table: impl Into<String>, phase: InitPhase, source: GatewayError) -> Self {
        GatewayError::TableInitialization {
            table: table.into(),
            phase,
            source: Box::new(source),
        }
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        GatewayError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn persistence(op: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Persistence {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Phase of a failed initialization, if this is one
    pub fn init_phase(&self) -> Option<InitPhase> {
        match self {
            GatewayError::TableInitialization { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl From<&GatewayError> for ExError {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::TableInitialization {
                table,
                phase,
                source,
            } => ExError::new(ExErrorKind::Initialization)
                .with_op(format!("initialize_{}", phase))
                .with_table(table)
                .with_message(format!("Table {} failed", phase))
                .with_source(ExError::from(&**source)),

            GatewayError::RowNotFound { table, id } => ExError::new(ExErrorKind::NotFound)
                .with_table(table)
                .with_entity_id(id.to_string())
                .with_message("Row not found"),

            GatewayError::ExpiredRow => {
                ExError::new(ExErrorKind::Expired).with_message("Row has expired")
            }

            GatewayError::InvalidConfiguration { reason } => {
                ExError::new(ExErrorKind::InvalidConfiguration).with_message(reason.clone())
            }

            GatewayError::NotConfigured { name } => ExError::new(ExErrorKind::NotConfigured)
                .with_entity_id(name)
                .with_message("No gateway context registered"),

            GatewayError::UnknownColumn { table, column } => {
                ExError::new(ExErrorKind::UnknownColumn)
                    .with_table(table)
                    .with_entity_id(column)
                    .with_message("Unknown column")
            }

            GatewayError::ValueConversion {
                column,
                column_type,
                reason,
            } => ExError::new(ExErrorKind::Conversion)
                .with_entity_id(column)
                .with_message(format!("{}: {}", column_type, reason)),

            GatewayError::Schema { table, message } => ExError::new(ExErrorKind::Schema)
                .with_table(table)
                .with_message(message.clone()),

            GatewayError::Persistence { op, message } => ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message(message.clone()),

            GatewayError::Concurrency { message } => {
                ExError::new(ExErrorKind::Concurrency).with_message(message.clone())
            }

            GatewayError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message.clone())
            }
        }
    }
}

impl From<GatewayError> for ExError {
    fn from(err: GatewayError) -> Self {
        ExError::from(&err)
    }
}
