//! Export forms of a [`Manifest`].

use std::{borrow::Cow, fmt};

use strum::{IntoStaticStr, VariantArray};

use super::{EffectiveAssignment, Manifest, Row};

/// Marker of a value cut by [`truncate()`].
pub const ELLIPSIS: &str = "..";

/// Escapes the provided `value` to be placed into a CSV field.
///
/// A value containing a comma, a line break or a quote is wrapped into quotes
/// with its inner quotes doubled.
#[must_use]
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains([',', '\n', '\r', '"']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
}

/// Truncates the provided `value` to the provided `width` in characters,
/// marking the cut with the [`ELLIPSIS`].
#[must_use]
pub fn truncate(value: &str, width: usize) -> Cow<'_, str> {
    if value.chars().count() <= width {
        return Cow::Borrowed(value);
    }
    let Some(keep) = width.checked_sub(ELLIPSIS.len()) else {
        return Cow::Owned(ELLIPSIS.chars().take(width).collect());
    };
    Cow::Owned(value.chars().take(keep).chain(ELLIPSIS.chars()).collect())
}

/// Column of an exported [`Manifest`].
#[derive(
    Clone, Copy, Debug, Eq, Hash, IntoStaticStr, PartialEq, VariantArray,
)]
pub enum Column {
    /// Normalized pickup time.
    #[strum(serialize = "Pickup")]
    PickupTime,

    /// Pickup window.
    #[strum(serialize = "Pickup window")]
    PickupWindow,

    /// Name of the customer.
    #[strum(serialize = "Customer")]
    CustomerName,

    /// Hotel the customers are picked up from.
    #[strum(serialize = "Hotel")]
    Hotel,

    /// Hotel room of the customers.
    #[strum(serialize = "Room")]
    RoomNumber,

    /// Number of adults.
    #[strum(serialize = "Adults")]
    Adults,

    /// Number of children.
    #[strum(serialize = "Children")]
    Children,

    /// Number of infants.
    #[strum(serialize = "Infants")]
    Infants,

    /// Booked program.
    #[strum(serialize = "Program")]
    Program,

    /// Agent the booking was placed through.
    #[strum(serialize = "Agent")]
    Agent,

    /// Agent's staff the booking was placed by.
    #[strum(serialize = "Agent staff")]
    AgentStaff,

    /// Driver picking the customers up.
    #[strum(serialize = "Driver")]
    Driver,

    /// Boat carrying the customers.
    #[strum(serialize = "Boat")]
    Boat,

    /// Effective guide.
    #[strum(serialize = "Guide")]
    Guide,

    /// Effective restaurant.
    #[strum(serialize = "Restaurant")]
    Restaurant,

    /// Way the guide and the restaurant were resolved.
    #[strum(serialize = "Assignment")]
    Assignment,

    /// Cash to be collected on pickup.
    #[strum(serialize = "Collect")]
    CollectMoney,

    /// Status of the booking.
    #[strum(serialize = "Status")]
    Status,

    /// Way the booking is paid.
    #[strum(serialize = "Payment")]
    PaymentType,

    /// Resolved price, empty if not resolvable.
    #[strum(serialize = "Price")]
    Price,

    /// Billed flag.
    #[strum(serialize = "Billed")]
    Billed,

    /// Remarks to the booking.
    #[strum(serialize = "Remarks")]
    Remarks,
}

impl Column {
    /// All the [`Column`]s in the order they are exported.
    pub const ALL: &'static [Self] = Self::VARIANTS;

    /// [`Column`]s of a boat section.
    pub const SECTION: &'static [Self] = &[
        Self::PickupWindow,
        Self::CustomerName,
        Self::Hotel,
        Self::RoomNumber,
        Self::Adults,
        Self::Children,
        Self::Infants,
        Self::Program,
        Self::Agent,
        Self::Driver,
        Self::Guide,
        Self::Restaurant,
        Self::CollectMoney,
        Self::Remarks,
    ];

    /// Returns the header of this [`Column`].
    #[must_use]
    pub fn header(self) -> &'static str {
        self.into()
    }

    /// Returns the raw value of this [`Column`] in the provided [`Row`].
    #[must_use]
    pub fn value(self, row: &Row) -> String {
        fn name<T: AsRef<str>>(name: Option<&T>) -> String {
            name.map(|n| n.as_ref().to_owned()).unwrap_or_default()
        }

        let r = &row.booking;
        let b = &r.booking;
        match self {
            Self::PickupTime => {
                b.pickup_time.map(|t| t.to_string()).unwrap_or_default()
            }
            Self::PickupWindow => {
                row.pickup_window().map(|w| w.to_string()).unwrap_or_default()
            }
            Self::CustomerName => b.customer_name.to_string(),
            Self::Hotel => name(r.hotel.as_ref().map(|h| &h.name)),
            Self::RoomNumber => name(b.room_number.as_ref()),
            Self::Adults => b.passengers.adults.to_string(),
            Self::Children => b.passengers.children.to_string(),
            Self::Infants => b.passengers.infants.to_string(),
            Self::Program => r.program.name.to_string(),
            Self::Agent => name(r.agent.as_ref().map(|a| &a.name)),
            Self::AgentStaff => name(r.agent_staff.as_ref().map(|s| &s.name)),
            Self::Driver => name(r.driver.as_ref().map(|d| &d.name)),
            Self::Boat => name(r.boat.as_ref().map(|b| &b.name)),
            Self::Guide => name(row.assignment.guide().map(|g| &g.name)),
            Self::Restaurant => {
                name(row.assignment.restaurant().map(|r| &r.name))
            }
            Self::Assignment => match row.assignment {
                EffectiveAssignment::Locked { .. } => "locked",
                EffectiveAssignment::DirectOverride { .. } => "direct",
                EffectiveAssignment::Unassigned => "unassigned",
            }
            .to_owned(),
            Self::CollectMoney => {
                b.collect_money.map(|m| m.to_string()).unwrap_or_default()
            }
            Self::Status => b.status.to_string(),
            Self::PaymentType => b.payment_type.to_string(),
            Self::Price => row
                .price
                .as_ref()
                .map(|p| p.total.to_string())
                .unwrap_or_default(),
            Self::Billed => if row.billed { "yes" } else { "no" }.to_owned(),
            Self::Remarks => name(b.remarks.as_ref()),
        }
    }
}

/// Text section of a [`Manifest`] listing the [`Row`]s of a single boat.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Section {
    /// Name of the boat, if any.
    pub boat: Option<String>,

    /// Name of the guide assigned to the boat, if any.
    pub guide: Option<String>,

    /// Name of the restaurant assigned to the boat, if any.
    pub restaurant: Option<String>,

    /// Truncated headers of the [`Column`]s.
    pub header: Vec<String>,

    /// Truncated values of the [`Column`]s, one line per [`Row`].
    pub lines: Vec<Vec<String>>,

    /// Width every cell of this [`Section`] is fitted into.
    pub width: usize,
}

impl Section {
    /// Returns the heading of this [`Section`].
    #[must_use]
    pub fn heading(&self) -> String {
        let Some(boat) = &self.boat else {
            return "No boat".to_owned();
        };
        format!(
            "Boat: {boat} | Guide: {} | Restaurant: {}",
            self.guide.as_deref().unwrap_or("-"),
            self.restaurant.as_deref().unwrap_or("-"),
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width;
        writeln!(f, "{}", self.heading())?;
        for cells in std::iter::once(&self.header).chain(&self.lines) {
            let line = cells
                .iter()
                .map(|c| format!("{c:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

impl Manifest {
    /// Exports this [`Manifest`] as CSV with the provided [`Column`]s.
    ///
    /// Lines are separated by `\r\n`, and fields are quoted the same way
    /// [`escape`] does.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_csv(&self, columns: &[Column]) -> String {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());

        // Writing equally long records into a `Vec` never fails.
        writer
            .write_record(columns.iter().map(|c| c.header()))
            .expect("infallible");
        for row in self.rows() {
            writer
                .write_record(columns.iter().map(|c| c.value(row)))
                .expect("infallible");
        }
        let bytes = writer.into_inner().expect("infallible");
        String::from_utf8(bytes).expect("written from `str`s")
    }

    /// Exports this [`Manifest`] as [`Section`]s of the provided [`Column`]s,
    /// one per boat, with every cell [`truncate`]d to the provided `width`.
    ///
    /// [`Row`]s without a boat are listed in the last [`Section`].
    #[must_use]
    pub fn sections(&self, columns: &[Column], width: usize) -> Vec<Section> {
        let cell = |v: &str| truncate(v, width).into_owned();

        self.by_boat()
            .into_iter()
            .map(|group| {
                let lock = group.rows.iter().find_map(|r| {
                    if let EffectiveAssignment::Locked { guide, restaurant } =
                        &r.assignment
                    {
                        Some((guide, restaurant))
                    } else {
                        None
                    }
                });
                Section {
                    boat: group.key.map(|b| b.name.to_string()),
                    guide: lock
                        .and_then(|(g, _)| g.as_ref())
                        .map(|g| g.name.to_string()),
                    restaurant: lock
                        .and_then(|(_, r)| r.as_ref())
                        .map(|r| r.name.to_string()),
                    header: columns.iter().map(|c| cell(c.header())).collect(),
                    lines: group
                        .rows
                        .iter()
                        .map(|row| {
                            columns
                                .iter()
                                .map(|c| cell(&c.value(row)))
                                .collect()
                        })
                        .collect(),
                    width,
                }
            })
            .collect()
    }
}
