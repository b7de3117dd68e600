pub mod supabase;

pub use supabase::SupabaseAdapter;
