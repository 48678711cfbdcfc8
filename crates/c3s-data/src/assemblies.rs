use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct GeneralAssembly {
    pub number: u32,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GeneralAssemblyFilter {
    pub number: Option<u32>,
    pub date_after: Option<NaiveDate>,
}

/// A member's invitation to a general assembly
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Invitation {
    pub general_assembly_number: u32,
    pub member_id: u32,
    pub sent_at: NaiveDateTime,
    pub token: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvitationFilter {
    pub general_assembly_number: Option<u32>,
    pub member_id: Option<u32>,
}
