pub mod unfold;
