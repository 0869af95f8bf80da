//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use rpg_particles::impl_default;
///
/// struct Spark {
///     lifetime: f32,
///     label: String,
/// }
///
/// impl_default!(Spark {
///     lifetime: 1.0,
///     label: String::new(),
/// });
///
/// assert_eq!(Spark::default().lifetime, 1.0);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 同时实现Default和new()的宏
///
/// 使用示例:
/// ```rust
/// use rpg_particles::impl_default_and_new;
///
/// struct Wind {
///     strength: f32,
/// }
///
/// impl_default_and_new!(Wind {
///     strength: 0.5,
/// });
///
/// assert_eq!(Wind::new().strength, 0.5);
/// ```
#[macro_export]
macro_rules! impl_default_and_new {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }

        impl $struct_name {
            pub fn new() -> Self {
                Self::default()
            }
        }
    };
}
