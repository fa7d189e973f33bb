pub mod bit_pack;
