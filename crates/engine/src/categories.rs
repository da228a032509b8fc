//! Default category lists offered to clients.
//!
//! Categories are stored as free text on goals and budget expenses; these
//! lists are only suggestions and the engine never rejects other values.

/// Suggested categories for a savings goal.
pub const GOAL_CATEGORIES: [&str; 8] = [
    "Emergency Fund",
    "Vacation",
    "Car",
    "House",
    "Education",
    "Electronics",
    "Investment",
    "Other",
];

/// Suggested categories for a budget expense.
pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Utility Bill",
    "Emergency",
    "Appliances",
    "Gadgets",
    "Repairs",
    "Other",
];

/// Category used when a goal is created without one.
pub const DEFAULT_GOAL_CATEGORY: &str = GOAL_CATEGORIES[0];
