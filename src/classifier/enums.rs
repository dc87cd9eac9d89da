// Copyright (C) 2025 Kashin Vladislav
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use phonenumber::Type;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Stable output vocabulary for the kind of line a valid number belongs to.
///
/// The string forms (`CELL_PHONE`, `LANDLINE`, ...) are part of the public
/// event schema and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[derive(Display, AsRefStr, EnumIter, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    /// **Mobile numbers.**
    /// Assigned to wireless devices.
    CellPhone,
    /// **Fixed-line numbers.**
    /// Traditional landlines tied to a geographic location.
    Landline,
    /// **Fixed-line or mobile.**
    /// Regions such as the USA, where the two share one numbering pattern and
    /// the number itself cannot tell them apart.
    LandlineOrCellPhone,
    /// **Voice over IP numbers.**
    Voip,
    /// **Toll-free numbers.**
    /// The recipient pays for the call ("800" or "888" numbers in the US).
    TollFree,
    /// **Premium-rate numbers.**
    PremiumRate,
    /// **Shared-cost numbers.**
    /// Cost of the call is split between caller and recipient.
    SharedCost,
    /// **Personal numbers.**
    /// Routed to a person rather than a location or device.
    PersonalNumber,
    /// **Pagers.**
    Pager,
    /// **Universal Access Numbers.**
    Uan,
    /// **Voicemail access numbers.**
    Voicemail,
    /// **Unknown type.**
    /// The number is valid but its category could not be determined.
    Unknown,
}

impl From<Type> for LineType {
    fn from(value: Type) -> Self {
        match value {
            Type::Mobile => LineType::CellPhone,
            Type::FixedLine => LineType::Landline,
            Type::FixedLineOrMobile => LineType::LandlineOrCellPhone,
            Type::Voip => LineType::Voip,
            Type::TollFree => LineType::TollFree,
            Type::PremiumRate => LineType::PremiumRate,
            Type::SharedCost => LineType::SharedCost,
            Type::PersonalNumber => LineType::PersonalNumber,
            Type::Pager => LineType::Pager,
            Type::Uan => LineType::Uan,
            Type::Voicemail => LineType::Voicemail,
            // Unknown, emergency, short codes and whatever the metadata
            // grows next all land here.
            _ => LineType::Unknown,
        }
    }
}
