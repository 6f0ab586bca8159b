//! Unified error codes for the gym backend
//!
//! This module defines all error codes used across the server and the admin
//! frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Member errors
//! - 5xxx: Billing errors
//! - 6xxx: Expense errors
//! - 7xxx: Inquiry errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,

    // ==================== 4xxx: Member ====================
    /// Member not found
    MemberNotFound = 4001,
    /// Phone number already registered to another member
    DuplicatePhone = 4002,
    /// Email already registered to another member
    DuplicateEmail = 4003,
    /// Membership duration label not recognized
    InvalidDuration = 4004,
    /// Start date invalid for the requested operation
    InvalidStartDate = 4005,

    // ==================== 5xxx: Billing ====================
    /// Payment amount invalid (non-positive or not finite)
    InvalidPaymentAmount = 5001,
    /// Payment history entry index out of range
    PaymentEntryNotFound = 5002,
    /// Only entries of type `payment` may be adjusted
    AdjustNotAllowed = 5003,
    /// Adjustment delta does not fit the cycles the entry funded
    CycleLimitExceeded = 5004,
    /// Payment month falls outside the member's cycle timeline
    PaymentMonthOutOfRange = 5005,
    /// Partial payment requires a promised payment date
    PromiseDateRequired = 5006,
    /// Promised payment date must not precede the payment date
    PromiseDateInPast = 5007,

    // ==================== 6xxx: Expense ====================
    /// Expense not found
    ExpenseNotFound = 6001,

    // ==================== 7xxx: Inquiry ====================
    /// Inquiry not found
    InquiryNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::DuplicatePhone => "Phone number already registered",
            ErrorCode::DuplicateEmail => "Email already registered",
            ErrorCode::InvalidDuration => "Invalid membership duration",
            ErrorCode::InvalidStartDate => "Invalid start date",

            // Billing
            ErrorCode::InvalidPaymentAmount => "Invalid payment amount",
            ErrorCode::PaymentEntryNotFound => "Payment history entry not found",
            ErrorCode::AdjustNotAllowed => "Only payment entries can be adjusted",
            ErrorCode::CycleLimitExceeded => "Adjustment exceeds cycle limits",
            ErrorCode::PaymentMonthOutOfRange => "Payment month outside member timeline",
            ErrorCode::PromiseDateRequired => "Partial payment requires a promised payment date",
            ErrorCode::PromiseDateInPast => "Promised payment date is in the past",

            // Expense
            ErrorCode::ExpenseNotFound => "Expense not found",

            // Inquiry
            ErrorCode::InquiryNotFound => "Inquiry not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Member
            4001 => Ok(ErrorCode::MemberNotFound),
            4002 => Ok(ErrorCode::DuplicatePhone),
            4003 => Ok(ErrorCode::DuplicateEmail),
            4004 => Ok(ErrorCode::InvalidDuration),
            4005 => Ok(ErrorCode::InvalidStartDate),

            // Billing
            5001 => Ok(ErrorCode::InvalidPaymentAmount),
            5002 => Ok(ErrorCode::PaymentEntryNotFound),
            5003 => Ok(ErrorCode::AdjustNotAllowed),
            5004 => Ok(ErrorCode::CycleLimitExceeded),
            5005 => Ok(ErrorCode::PaymentMonthOutOfRange),
            5006 => Ok(ErrorCode::PromiseDateRequired),
            5007 => Ok(ErrorCode::PromiseDateInPast),

            // Expense
            6001 => Ok(ErrorCode::ExpenseNotFound),

            // Inquiry
            7001 => Ok(ErrorCode::InquiryNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
