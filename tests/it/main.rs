mod budget;
mod column;
mod delta_bitpacked;
mod hybrid_rle;
mod interop;
