//! Canonical bit layout of tunnel entrances and bridge ramps.
//!
//! Every accessor in this crate reads and writes tile fields through the spans
//! declared here, so the mapping from bits to meaning lives in one place.
//! Spans sharing a field are checked for overlap at compile time.
//!
//! The 8-way direction of a rail tunnel is split across two spans of `m5`:
//! [`m5::DIRECTION`] always holds the 4-way base direction (the 8-way value
//! shifted right by one), and [`m5::EXTENDED_LOW_BIT`] holds the dropped low
//! bit while [`m5::EXTENDED_DIRECTION`] is set. Readers unaware of the
//! extension therefore still see a valid 4-way direction.

/// Unsigned tile field that spans can be applied to.
pub trait Field: Copy {
    /// Widens the field value.
    fn to_u16(self) -> u16;
    /// Narrows a value back into the field type, dropping excess high bits.
    fn from_u16(value: u16) -> Self;
}

impl Field for u8 {
    fn to_u16(self) -> u16 {
        u16::from(self)
    }

    fn from_u16(value: u16) -> Self {
        (value & 0xFF) as u8
    }
}

impl Field for u16 {
    fn to_u16(self) -> u16 {
        self
    }

    fn from_u16(value: u16) -> Self {
        value
    }
}

/// Contiguous run of bits inside one tile field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitSpan {
    start: u8,
    width: u8,
}

impl BitSpan {
    /// Declares a span of `width` bits starting at bit `start`.
    #[must_use]
    pub const fn new(start: u8, width: u8) -> Self {
        assert!(width > 0 && start as u32 + width as u32 <= 16);
        Self { start, width }
    }

    /// Index of the lowest bit.
    #[must_use]
    pub const fn start(self) -> u8 {
        self.start
    }

    /// Number of bits covered.
    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Mask selecting the span within its field.
    #[must_use]
    pub const fn mask(self) -> u16 {
        (((1u32 << self.width) - 1) << self.start) as u16
    }

    /// Reports whether both spans claim a common bit.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.mask() & other.mask() != 0
    }

    /// Reports whether `value` can be stored in the span without losing bits.
    #[must_use]
    pub const fn fits(self, value: u16) -> bool {
        value <= self.mask() >> self.start
    }

    /// Extracts the span from `field`, shifted down to bit zero.
    #[must_use]
    pub fn get<F: Field>(self, field: F) -> F {
        F::from_u16((field.to_u16() & self.mask()) >> self.start)
    }

    /// Overwrites the span in `field` with `value`, leaving other bits alone.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in the span.
    pub fn set<F: Field>(self, field: &mut F, value: F) {
        let mask = self.mask();
        assert!(
            self.fits(value.to_u16()),
            "value {} does not fit in {} bits",
            value.to_u16(),
            self.width
        );
        let shifted = (value.to_u16() << self.start) & mask;
        *field = F::from_u16((field.to_u16() & !mask) | shifted);
    }

    /// Reports whether any bit of the span is set.
    #[must_use]
    pub fn is_set<F: Field>(self, field: F) -> bool {
        field.to_u16() & self.mask() != 0
    }

    /// Sets a single-bit span to `on`.
    pub fn assign<F: Field>(self, field: &mut F, on: bool) {
        self.set(field, F::from_u16(u16::from(on)));
    }
}

/// Owner byte.
#[rustfmt::skip]
pub mod m1 {
    use super::BitSpan;

    /// Owner of the tile.
    pub const OWNER: BitSpan = BitSpan::new(0, 5);
}

/// Tram ownership.
#[rustfmt::skip]
pub mod m3 {
    use super::BitSpan;

    /// Owner of the tram half. The town value doubles as "no owner".
    pub const TRAM_OWNER: BitSpan = BitSpan::new(4, 4);
}

/// Road type.
#[rustfmt::skip]
pub mod m4 {
    use super::BitSpan;

    /// Road type of the road half.
    pub const ROAD_TYPE: BitSpan = BitSpan::new(0, 6);
}

/// Wormhole record: direction, transport and flags.
#[rustfmt::skip]
pub mod m5 {
    use super::BitSpan;

    /// 4-way base direction, pointing towards the other end.
    pub const DIRECTION: BitSpan          = BitSpan::new(0, 2);
    /// Transport type.
    pub const TRANSPORT: BitSpan          = BitSpan::new(2, 2);
    /// Track reservation, rail only.
    pub const RESERVATION: BitSpan        = BitSpan::new(4, 1);
    /// Set when the direction is a diagonal; rail tunnels only.
    pub const EXTENDED_DIRECTION: BitSpan = BitSpan::new(5, 1);
    /// Least significant bit of the 8-way direction while extended.
    pub const EXTENDED_LOW_BIT: BitSpan   = BitSpan::new(6, 1);
    /// Wormhole kind: clear for tunnels, set for bridges.
    pub const BRIDGE: BitSpan             = BitSpan::new(7, 1);

    /// Every span stored in the byte.
    pub const ALL: [BitSpan; 6] = [
        DIRECTION,
        TRANSPORT,
        RESERVATION,
        EXTENDED_DIRECTION,
        EXTENDED_LOW_BIT,
        BRIDGE,
    ];
}

/// Bridge data.
#[rustfmt::skip]
pub mod m6 {
    use super::BitSpan;

    /// Bridge type of a ramp; cleared on tunnels.
    pub const BRIDGE_TYPE: BitSpan = BitSpan::new(2, 4);
}

/// Road ownership and ground cover.
#[rustfmt::skip]
pub mod m7 {
    use super::BitSpan;

    /// Owner of the road half.
    pub const ROAD_OWNER: BitSpan     = BitSpan::new(0, 5);
    /// Snow or desert around the entrance or ramp.
    pub const SNOW_OR_DESERT: BitSpan = BitSpan::new(5, 1);

    /// Every span stored in the byte.
    pub const ALL: [BitSpan; 2] = [ROAD_OWNER, SNOW_OR_DESERT];
}

/// Rail and tram types.
#[rustfmt::skip]
pub mod m8 {
    use super::BitSpan;

    /// Rail type.
    pub const RAIL_TYPE: BitSpan = BitSpan::new(0, 6);
    /// Tram type of the tram half.
    pub const TRAM_TYPE: BitSpan = BitSpan::new(6, 6);

    /// Every span stored in the word.
    pub const ALL: [BitSpan; 2] = [RAIL_TYPE, TRAM_TYPE];
}

const fn pairwise_disjoint(spans: &[BitSpan]) -> bool {
    let mut i = 0;
    while i < spans.len() {
        let mut j = i + 1;
        while j < spans.len() {
            if spans[i].overlaps(spans[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn fits_in_byte(spans: &[BitSpan]) -> bool {
    let mut i = 0;
    while i < spans.len() {
        if spans[i].mask() > 0xFF {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(pairwise_disjoint(&m5::ALL) && fits_in_byte(&m5::ALL));
const _: () = assert!(pairwise_disjoint(&m7::ALL) && fits_in_byte(&m7::ALL));
const _: () = assert!(pairwise_disjoint(&m8::ALL));
const _: () = assert!(fits_in_byte(&[m1::OWNER, m3::TRAM_OWNER, m4::ROAD_TYPE, m6::BRIDGE_TYPE]));
