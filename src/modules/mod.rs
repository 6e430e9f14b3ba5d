pub mod gif2spr;
