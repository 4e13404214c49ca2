//! Field resolution table for balance payloads.
//!
//! Each target field lists the payload paths it may be read from together
//! with a priority. Lower priority wins. The convention is:
//!
//! | Priority | Source |
//! |----------|--------|
//! | 0 | nested snake_case (`balance.available_balance`) |
//! | 1 | nested camelCase or nested alias (`balance.availableBalance`) |
//! | 2+ | top-level legacy keys (`availableBalance`) |
//!
//! A field with no present candidate defaults to zero.

/// Dotted path into the raw payload, one segment per object key.
pub type FieldPath = &'static [&'static str];

/// One place a field may be found, and how much it is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub path: FieldPath,
    pub priority: u8,
}

const fn at(path: FieldPath, priority: u8) -> Candidate {
    Candidate { path, priority }
}

/// Target amounts of a [`NormalizedBalance`](super::NormalizedBalance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceField {
    AvailableBalance,
    PendingBalance,
    TotalBalance,
    CommissionDeducted,
    NetRevenue,
    TotalPaidOut,
    TotalRefunded,
    SettledCommission,
    UnsettledCommission,
    SettledNetRevenue,
    UnsettledNetRevenue,
}

impl BalanceField {
    /// Stable snake_case name, used in warnings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AvailableBalance => "available_balance",
            Self::PendingBalance => "pending_balance",
            Self::TotalBalance => "total_balance",
            Self::CommissionDeducted => "commission_deducted",
            Self::NetRevenue => "net_revenue",
            Self::TotalPaidOut => "total_paid_out",
            Self::TotalRefunded => "total_refunded",
            Self::SettledCommission => "settled_commission",
            Self::UnsettledCommission => "unsettled_commission",
            Self::SettledNetRevenue => "settled_net_revenue",
            Self::UnsettledNetRevenue => "unsettled_net_revenue",
        }
    }
}

/// Resolution rule for one target field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: BalanceField,
    pub candidates: &'static [Candidate],
}

impl FieldRule {
    /// Candidates sorted by ascending priority.
    #[must_use]
    pub fn ordered(&self) -> Vec<Candidate> {
        let mut ordered = self.candidates.to_vec();
        ordered.sort_by_key(|c| c.priority);
        ordered
    }
}

/// The canonical merged resolution table.
pub const BALANCE_FIELDS: &[FieldRule] = &[
    FieldRule {
        field: BalanceField::AvailableBalance,
        candidates: &[
            at(&["balance", "available_balance"], 0),
            at(&["balance", "availableBalance"], 1),
            at(&["availableBalance"], 2),
            at(&["available_balance"], 3),
        ],
    },
    FieldRule {
        field: BalanceField::PendingBalance,
        candidates: &[
            at(&["balance", "pending_payouts"], 0),
            at(&["balance", "pendingPayouts"], 1),
            at(&["balance", "pendingBalance"], 2),
            at(&["pendingBalance"], 3),
            at(&["pending_payouts"], 4),
        ],
    },
    FieldRule {
        field: BalanceField::TotalBalance,
        candidates: &[
            at(&["balance", "total_revenue"], 0),
            at(&["balance", "totalRevenue"], 1),
            at(&["balance", "totalBalance"], 2),
            at(&["totalBalance"], 3),
            at(&["total_revenue"], 4),
        ],
    },
    FieldRule {
        field: BalanceField::CommissionDeducted,
        candidates: &[
            at(&["balance", "commission_deducted"], 0),
            at(&["balance", "total_commission"], 1),
            at(&["balance", "commissionDeducted"], 2),
            at(&["balance", "totalCommission"], 3),
            at(&["commissionDeducted"], 4),
        ],
    },
    FieldRule {
        field: BalanceField::NetRevenue,
        candidates: &[
            at(&["balance", "net_revenue"], 0),
            at(&["balance", "netRevenue"], 1),
            at(&["netRevenue"], 2),
        ],
    },
    FieldRule {
        field: BalanceField::TotalPaidOut,
        candidates: &[
            at(&["balance", "total_paid_out"], 0),
            at(&["balance", "totalPaidOut"], 1),
            at(&["totalPaidOut"], 2),
        ],
    },
    FieldRule {
        field: BalanceField::TotalRefunded,
        candidates: &[
            at(&["balance", "total_refunded"], 0),
            at(&["balance", "totalRefunded"], 1),
            at(&["totalRefunded"], 2),
        ],
    },
    FieldRule {
        field: BalanceField::SettledCommission,
        candidates: &[
            at(&["balance", "settled_commission"], 0),
            at(&["balance", "settledCommission"], 1),
        ],
    },
    FieldRule {
        field: BalanceField::UnsettledCommission,
        candidates: &[
            at(&["balance", "unsettled_commission"], 0),
            at(&["balance", "unsettledCommission"], 1),
        ],
    },
    FieldRule {
        field: BalanceField::SettledNetRevenue,
        candidates: &[
            at(&["balance", "settled_net_revenue"], 0),
            at(&["balance", "settledNetRevenue"], 1),
        ],
    },
    FieldRule {
        field: BalanceField::UnsettledNetRevenue,
        candidates: &[
            at(&["balance", "unsettled_net_revenue"], 0),
            at(&["balance", "unsettledNetRevenue"], 1),
        ],
    },
];

/// Render a path as `a.b.c` for logs and reports.
#[must_use]
pub fn dotted(path: &[&str]) -> String {
    path.join(".")
}
