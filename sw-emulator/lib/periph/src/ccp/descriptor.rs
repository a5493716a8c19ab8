/*++

Licensed under the Apache-2.0 license.

File Name:

    descriptor.rs

Abstract:

    File contains the CCP v5 command descriptor codec.

--*/

use super::error::CcpError;
use bitfield::bitfield;
use ccp_emu_types::{emu_enum, GuestAddr};

emu_enum!(
    /// Memory a descriptor address refers to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub MemSpace;
    u32;
    {
        /// Guest system memory
        System = 0,

        /// On-device scratch buffer
        ScratchBuffer = 1,

        /// Local memory. Behaves exactly like system memory.
        Local = 2,
    };
    Invalid
);

emu_enum!(
    /// Engine selected by a descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub CcpEngine;
    u32;
    {
        Aes = 0,
        XtsAes = 1,
        Des3 = 2,
        Sha = 3,
        Rsa = 4,
        Passthrough = 5,
        ZlibDecompress = 6,
        Ecc = 7,
    };
    Invalid
);

bitfield! {
    /// Descriptor word 0: control flags, function and engine
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct DescDword0(u32);

    soc, set_soc: 0;
    ioc, set_ioc: 1;
    u32, rsvd1, set_rsvd1: 2, 2;
    init, set_init: 3;
    eom, set_eom: 4;
    u32, function, set_function: 19, 5;
    u32, engine, set_engine: 23, 20;
    prot, set_prot: 24;
    u32, rsvd2, set_rsvd2: 31, 25;
}

bitfield! {
    /// Descriptor word 3: source address high, memory type and context id
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct DescDword3(u32);

    u32, src_hi, set_src_hi: 15, 0;
    u32, src_mem, set_src_mem: 17, 16;
    u32, lsb_ctx_id, set_lsb_ctx_id: 25, 18;
    u32, rsvd1, set_rsvd1: 30, 26;
    src_fixed, set_src_fixed: 31;
}

bitfield! {
    /// Descriptor word 5 for every engine but SHA
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct DescDword5(u32);

    u32, dst_hi, set_dst_hi: 15, 0;
    u32, dst_mem, set_dst_mem: 17, 16;
    u32, rsvd1, set_rsvd1: 30, 18;
    dst_fixed, set_dst_fixed: 31;
}

bitfield! {
    /// Descriptor word 7: key address high and memory type
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct DescDword7(u32);

    u32, key_hi, set_key_hi: 15, 0;
    u32, key_mem, set_key_mem: 17, 16;
    u32, rsvd1, set_rsvd1: 31, 18;
}

/// Address field of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescAddr {
    /// 48-bit address, or byte offset for the scratch buffer
    pub addr: GuestAddr,

    pub space: MemSpace,

    /// Address stays put instead of incrementing
    pub fixed: bool,
}

impl DescAddr {
    pub fn new(space: MemSpace, addr: GuestAddr) -> Self {
        Self {
            addr,
            space,
            fixed: false,
        }
    }

    fn lo(&self) -> u32 {
        self.addr as u32
    }

    fn hi(&self) -> u32 {
        ((self.addr >> 32) & 0xffff) as u32
    }

    fn join(lo: u32, hi: u32) -> GuestAddr {
        (u64::from(hi) << 32) | u64::from(lo)
    }
}

impl Default for DescAddr {
    fn default() -> Self {
        Self::new(MemSpace::System, 0)
    }
}

/// Second operand of a descriptor. Words 4 and 5 hold a destination for every
/// engine but SHA, which keeps the total message length in bits there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescTarget {
    Dest(DescAddr),
    ShaLen(u64),
}

/// Decoded CCP command descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Stop on completion
    pub soc: bool,

    /// Interrupt on completion
    pub ioc: bool,

    pub init: bool,

    /// End of message
    pub eom: bool,

    /// Engine specific function code (15 bits)
    pub function: u16,

    pub engine: CcpEngine,

    /// Protected operation
    pub prot: bool,

    pub length: u32,

    pub source: DescAddr,

    pub target: DescTarget,

    pub key: DescAddr,

    /// Scratch buffer slot for IVs and hash state
    pub context_id: u8,

    /// Reserved bits found set while decoding
    reserved: u32,
}

impl Descriptor {
    /// Size of a descriptor in the ring
    pub const SIZE: usize = 32;

    /// Create an empty descriptor for `engine`
    pub fn new(engine: CcpEngine) -> Self {
        let target = match engine {
            CcpEngine::Sha => DescTarget::ShaLen(0),
            _ => DescTarget::Dest(DescAddr::default()),
        };
        Self {
            soc: false,
            ioc: false,
            init: false,
            eom: false,
            function: 0,
            engine,
            prot: false,
            length: 0,
            source: DescAddr::default(),
            target,
            key: DescAddr::default(),
            context_id: 0,
            reserved: 0,
        }
    }

    /// Decode a descriptor from its ring representation
    pub fn decode(raw: &[u8; Self::SIZE]) -> Self {
        let mut dw = [0u32; 8];
        for (word, bytes) in dw.iter_mut().zip(raw.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let dw0 = DescDword0(dw[0]);
        let dw3 = DescDword3(dw[3]);
        let dw7 = DescDword7(dw[7]);
        let engine = CcpEngine::from(dw0.engine());

        let mut reserved = dw0.rsvd1() | dw0.rsvd2() | dw3.rsvd1() | dw7.rsvd1();
        let target = match engine {
            CcpEngine::Sha => DescTarget::ShaLen(DescAddr::join(dw[4], dw[5])),
            _ => {
                let dw5 = DescDword5(dw[5]);
                reserved |= dw5.rsvd1();
                DescTarget::Dest(DescAddr {
                    addr: DescAddr::join(dw[4], dw5.dst_hi()),
                    space: MemSpace::from(dw5.dst_mem()),
                    fixed: dw5.dst_fixed(),
                })
            }
        };

        Self {
            soc: dw0.soc(),
            ioc: dw0.ioc(),
            init: dw0.init(),
            eom: dw0.eom(),
            function: dw0.function() as u16,
            engine,
            prot: dw0.prot(),
            length: dw[1],
            source: DescAddr {
                addr: DescAddr::join(dw[2], dw3.src_hi()),
                space: MemSpace::from(dw3.src_mem()),
                fixed: dw3.src_fixed(),
            },
            target,
            key: DescAddr {
                addr: DescAddr::join(dw[6], dw7.key_hi()),
                space: MemSpace::from(dw7.key_mem()),
                fixed: false,
            },
            context_id: dw3.lsb_ctx_id() as u8,
            reserved,
        }
    }

    /// Encode the descriptor into its ring representation. Reserved bits are
    /// always written as zero.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut dw0 = DescDword0(0);
        dw0.set_soc(self.soc);
        dw0.set_ioc(self.ioc);
        dw0.set_init(self.init);
        dw0.set_eom(self.eom);
        dw0.set_function(u32::from(self.function) & 0x7fff);
        dw0.set_engine(u32::from(self.engine) & 0xf);
        dw0.set_prot(self.prot);

        let mut dw3 = DescDword3(0);
        dw3.set_src_hi(self.source.hi());
        dw3.set_src_mem(u32::from(self.source.space) & 0x3);
        dw3.set_lsb_ctx_id(u32::from(self.context_id));
        dw3.set_src_fixed(self.source.fixed);

        let (dw4, dw5) = match self.target {
            DescTarget::ShaLen(bits) => (bits as u32, (bits >> 32) as u32),
            DescTarget::Dest(dest) => {
                let mut dw5 = DescDword5(0);
                dw5.set_dst_hi(dest.hi());
                dw5.set_dst_mem(u32::from(dest.space) & 0x3);
                dw5.set_dst_fixed(dest.fixed);
                (dest.lo(), dw5.0)
            }
        };

        let mut dw7 = DescDword7(0);
        dw7.set_key_hi(self.key.hi());
        dw7.set_key_mem(u32::from(self.key.space) & 0x3);

        let words = [
            dw0.0,
            self.length,
            self.source.lo(),
            dw3.0,
            dw4,
            dw5,
            self.key.lo(),
            dw7.0,
        ];
        let mut raw = [0u8; Self::SIZE];
        for (bytes, word) in raw.chunks_exact_mut(4).zip(words) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        raw
    }

    /// Destination address. SHA descriptors have none.
    pub fn dest(&self) -> Option<DescAddr> {
        match self.target {
            DescTarget::Dest(dest) => Some(dest),
            DescTarget::ShaLen(_) => None,
        }
    }

    /// Total message length in bits carried by a SHA descriptor
    pub fn sha_len(&self) -> Option<u64> {
        match self.target {
            DescTarget::ShaLen(bits) => Some(bits),
            DescTarget::Dest(_) => None,
        }
    }

    /// Control flags as laid out in word 0
    pub fn control_flags(&self) -> u32 {
        let mut dw0 = DescDword0(0);
        dw0.set_soc(self.soc);
        dw0.set_ioc(self.ioc);
        dw0.set_init(self.init);
        dw0.set_eom(self.eom);
        dw0.0
    }

    /// True if any reserved bit was set in the decoded words
    pub fn has_reserved_bits(&self) -> bool {
        self.reserved != 0
    }

    /// Check the constraints shared by every engine
    pub fn validate(&self) -> Result<(), CcpError> {
        if self.prot {
            Err(CcpError::Protected)?
        }
        if self.has_reserved_bits() {
            Err(CcpError::ReservedBits)?
        }

        let mut addrs = vec![self.source, self.key];
        addrs.extend(self.dest());
        for addr in addrs {
            if addr.fixed {
                Err(CcpError::FixedAddress)?
            }
            if !addr.space.is_valid() {
                Err(CcpError::MemType(addr.space))?
            }
        }
        Ok(())
    }
}
